mod console;
mod webhook;

pub use console::ConsoleAlert;
pub use webhook::{WebhookAlert, WebhookPayload};
