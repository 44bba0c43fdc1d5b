mod args;
mod json;
mod table;

pub use args::{Cli, OutputFormat};
pub use json::render_json;
pub use table::render_reports;
