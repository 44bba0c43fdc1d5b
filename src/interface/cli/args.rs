use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// How the end-of-run report is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain-text table, one row per endpoint
    #[default]
    Table,
    /// The full run summary as JSON
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "apiwatch",
    about = "Probe the GET endpoints of an OpenAPI-described API and alert on status changes",
    version
)]
pub struct Cli {
    /// Path to the config file (default: apiwatch.toml)
    #[arg(short, long, env = "APIWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}
