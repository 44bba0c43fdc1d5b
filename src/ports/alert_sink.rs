use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Observation, Status};

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("receiver rejected alert with HTTP {0}")]
    Rejected(u16),
}

/// Port for notifying someone that an endpoint changed status
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Name used in logs and diagnostics
    fn name(&self) -> &str;

    async fn on_up(&self, path: &str, observation: &Observation) -> Result<(), AlertError>;

    async fn on_down(&self, path: &str, observation: &Observation) -> Result<(), AlertError>;

    async fn on_degraded(&self, path: &str, observation: &Observation) -> Result<(), AlertError>;

    /// Route to the handler matching `status`
    async fn notify(&self, status: Status, path: &str, observation: &Observation) -> Result<(), AlertError> {
        match status {
            Status::Up => self.on_up(path, observation).await,
            Status::Down => self.on_down(path, observation).await,
            Status::Degraded => self.on_degraded(path, observation).await,
        }
    }
}
