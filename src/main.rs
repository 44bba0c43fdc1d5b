use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use apiwatch::adapters::{
    ConfiguredExamples, ConsoleAlert, FileStore, OpenApiSource, ReqwestTransport, TracingDiagnostics, WebhookAlert,
};
use apiwatch::application::{AlertDispatcher, MonitoringService, Prober, TargetResolver, Throttle};
use apiwatch::config::{AlertConfig, Config};
use apiwatch::interface::cli::{render_json, render_reports, Cli, OutputFormat};
use apiwatch::ports::{AlertSink, Diagnostics};

fn build_sinks(config: &Config) -> Vec<Arc<dyn AlertSink>> {
    config
        .alerts
        .iter()
        .map(|alert| match alert {
            AlertConfig::Console => Arc::new(ConsoleAlert) as Arc<dyn AlertSink>,
            AlertConfig::Webhook { url, headers } => {
                Arc::new(WebhookAlert::new(url.clone()).with_headers(headers.clone())) as Arc<dyn AlertSink>
            }
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    // Load configuration
    let explicit = cli.config.is_some();
    let config_path = Config::locate(cli.config);
    let config = Config::load(&config_path, explicit)?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("apiwatch={}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting apiwatch v{}", env!("CARGO_PKG_VERSION"));
    info!(
        spec = %config.spec_source,
        storage = %config.storage_path.display(),
        concurrency = config.concurrency,
        samples = config.samples,
        alerts = config.alerts.len(),
        "Configuration loaded from {}",
        config_path.display()
    );

    let diagnostics: Arc<dyn Diagnostics> = Arc::new(TracingDiagnostics);

    // Initialize adapters
    let schema_source = Arc::new(OpenApiSource::new(config.spec_source.clone(), config.timeout()));
    let transport = Arc::new(ReqwestTransport::new()?);
    let examples = Arc::new(ConfiguredExamples::new(
        config.examples.clone(),
        config.path_examples.clone(),
    ));

    let service = MonitoringService::new(
        schema_source,
        TargetResolver::new(examples, config.missing_parameter, diagnostics.clone()),
        Prober::new(
            transport,
            config.status_policy(),
            Arc::new(Throttle::per_second(config.concurrency)),
            config.timeout(),
        ),
        AlertDispatcher::new(build_sinks(&config), diagnostics.clone()),
    )
    .with_base_url(config.base_url.clone())
    .with_samples(config.samples);

    let mut store = FileStore::new(&config.storage_path, config.max_space_usage_bytes, diagnostics);

    let summary = match service.run_once(&mut store).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "run aborted");
            return Err(e.into());
        }
    };

    match cli.format {
        OutputFormat::Table => println!("{}", render_reports(&summary.reports)),
        OutputFormat::Json => println!("{}", render_json(&summary)?),
    }
    Ok(())
}
