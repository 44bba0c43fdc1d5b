use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::domain::Status;
use crate::ports::{AlertSink, Diagnostic, Diagnostics, ObservationStore};

/// One sink invocation made for a status change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertRecord {
    pub endpoint: String,
    pub status: Status,
    pub sink: String,
    pub delivered: bool,
}

/// Compares the two latest observations of each endpoint and notifies sinks
pub struct AlertDispatcher {
    sinks: Vec<Arc<dyn AlertSink>>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl AlertDispatcher {
    pub fn new(sinks: Vec<Arc<dyn AlertSink>>, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self { sinks, diagnostics }
    }

    /// Notify every sink, in registration order, about each endpoint whose
    /// status changed. A failing sink does not stop the others.
    pub async fn dispatch<S>(&self, store: &mut S, endpoints: &[String]) -> Vec<AlertRecord>
    where
        S: ObservationStore + ?Sized,
    {
        let mut records = Vec::new();

        for endpoint in endpoints {
            let state = store.get_state(endpoint).await;
            let (Some(status), Some(current)) = (state.transition(), state.current.as_ref()) else {
                continue;
            };

            info!(
                %endpoint,
                from = state.previous.as_ref().map(|p| p.status.as_str()).unwrap_or("none"),
                to = %status,
                "status changed"
            );

            for sink in &self.sinks {
                let delivered = match sink.notify(status, endpoint, current).await {
                    Ok(()) => true,
                    Err(e) => {
                        self.diagnostics.emit(Diagnostic::AlertFailed {
                            endpoint: endpoint.clone(),
                            sink: sink.name().to_string(),
                            reason: e.to_string(),
                        });
                        false
                    }
                };

                records.push(AlertRecord {
                    endpoint: endpoint.clone(),
                    status,
                    sink: sink.name().to_string(),
                    delivered,
                });
            }
        }

        records
    }
}
