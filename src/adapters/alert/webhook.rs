use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::domain::{Observation, Status};
use crate::ports::{AlertError, AlertSink};

/// JSON body posted for each status change
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub path: &'a str,
    pub status: Status,
    pub url: &'a str,
    pub duration_ms: u64,
    pub timestamp: i64,
}

/// Posts status changes to an HTTP endpoint
pub struct WebhookAlert {
    url: String,
    headers: BTreeMap<String, String>,
    client: Client,
    timeout: Duration,
}

impl WebhookAlert {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn post(&self, status: Status, path: &str, observation: &Observation) -> Result<(), AlertError> {
        let payload = WebhookPayload {
            path,
            status,
            url: &observation.url,
            duration_ms: observation.duration_ms,
            timestamp: observation.timestamp,
        };

        let mut request = self.client.post(&self.url).timeout(self.timeout).json(&payload);
        for (name, value) in &self.headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AlertError::Delivery(e.to_string()))?;

        let code = response.status();
        debug!(webhook = %self.url, %path, %status, code = code.as_u16(), "webhook delivered");
        if code.is_success() {
            Ok(())
        } else {
            Err(AlertError::Rejected(code.as_u16()))
        }
    }
}

#[async_trait]
impl AlertSink for WebhookAlert {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn on_up(&self, path: &str, observation: &Observation) -> Result<(), AlertError> {
        self.post(Status::Up, path, observation).await
    }

    async fn on_down(&self, path: &str, observation: &Observation) -> Result<(), AlertError> {
        self.post(Status::Down, path, observation).await
    }

    async fn on_degraded(&self, path: &str, observation: &Observation) -> Result<(), AlertError> {
        self.post(Status::Degraded, path, observation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_shape() {
        let observation = Observation::new(1_700_000_000_000, Status::Down, 812, "https://api.test/users/1");
        let payload = WebhookPayload {
            path: "/users/{id}",
            status: observation.status,
            url: &observation.url,
            duration_ms: observation.duration_ms,
            timestamp: observation.timestamp,
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "path": "/users/{id}",
                "status": "down",
                "url": "https://api.test/users/1",
                "duration_ms": 812,
                "timestamp": 1_700_000_000_000i64
            })
        );
    }

    #[tokio::test]
    async fn unreachable_receiver_is_a_delivery_error() {
        let sink = WebhookAlert::new("http://127.0.0.1:9/hook").with_timeout(Duration::from_millis(500));
        let observation = Observation::new(0, Status::Down, 0, "");
        assert!(matches!(
            sink.on_down("/x", &observation).await,
            Err(AlertError::Delivery(_))
        ));
    }
}
