use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{EndpointState, HistoryEntry, Observation};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Port for the per-endpoint observation history
#[async_trait]
pub trait ObservationStore: Send {
    /// Append an observation in memory and mark the endpoint as live
    async fn add(&mut self, endpoint: &str, observation: Observation);

    /// Drop stale endpoints, enforce the space budget and persist
    async fn flush(&mut self) -> Result<(), StoreError>;

    /// Latest and second-latest observation of an endpoint
    async fn get_state(&mut self, endpoint: &str) -> EndpointState;

    /// Full retained history of an endpoint, oldest first
    async fn get_history(&mut self, endpoint: &str) -> Vec<HistoryEntry>;
}
