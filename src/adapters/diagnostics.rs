use std::sync::Mutex;

use tracing::{debug, warn};

use crate::ports::{Diagnostic, Diagnostics};

/// Forwards diagnostics to the `tracing` subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn emit(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::HistoryTrimmed { endpoint, from, to } => {
                debug!(%endpoint, from, to, "trimmed stored history");
            }
            Diagnostic::EndpointsDropped { endpoints } => {
                debug!(count = endpoints.len(), "{}", diagnostic);
            }
            Diagnostic::AlertFailed { endpoint, sink, reason } => {
                warn!(%endpoint, %sink, %reason, "alert delivery failed");
            }
            _ => warn!("{}", diagnostic),
        }
    }
}

/// Keeps every diagnostic in memory, for callers that want to inspect them
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    events: Mutex<Vec<Diagnostic>>,
}

impl RecordingDiagnostics {
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn emit(&self, diagnostic: Diagnostic) {
        if let Ok(mut events) = self.events.lock() {
            events.push(diagnostic);
        }
    }
}
