use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// What the transport observed for one completed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportResponse {
    pub status_code: u16,
    /// Time from request start until the body was fully received
    pub elapsed: Duration,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid url {0}")]
    InvalidUrl(String),

    #[error("network error: {0}")]
    Network(String),
}

/// Port for issuing a single timed HTTP GET
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Result<TransportResponse, TransportError>;
}
