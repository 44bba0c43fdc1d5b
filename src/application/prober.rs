use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use tracing::debug;

use crate::domain::Sample;
use crate::ports::{HttpTransport, StatusPolicy};

use super::throttle::Throttle;

/// Issues rate-limited GET probes and classifies the answers
pub struct Prober {
    transport: Arc<dyn HttpTransport>,
    status_policy: Arc<dyn StatusPolicy>,
    throttle: Arc<Throttle>,
    timeout: Duration,
}

impl Prober {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        status_policy: Arc<dyn StatusPolicy>,
        throttle: Arc<Throttle>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            status_policy,
            throttle,
            timeout,
        }
    }

    /// One physical request. Failures become `down` samples.
    pub async fn probe(&self, endpoint: &str, url: &str) -> Sample {
        self.throttle.acquire().await;

        let started_at = Utc::now().timestamp_millis();
        let start = Instant::now();

        match self.transport.get(url, self.timeout).await {
            Ok(response) => {
                let duration_ms = response.elapsed.as_millis() as u64;
                let status = self
                    .status_policy
                    .classify(response.status_code, endpoint, duration_ms);
                debug!(%endpoint, code = response.status_code, duration_ms, %status, "probed");
                Sample {
                    started_at,
                    url: url.to_string(),
                    status_code: Some(response.status_code),
                    duration_ms,
                    succeeded: true,
                    status,
                }
            }
            Err(e) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                debug!(%endpoint, error = %e, duration_ms, "probe failed");
                Sample::failed(started_at, url, duration_ms)
            }
        }
    }

    /// `count` concurrent probes of one endpoint, returned in sample order
    pub async fn sample(&self, endpoint: &str, url: &str, count: usize) -> Vec<Sample> {
        join_all((0..count).map(|_| self.probe(endpoint, url))).await
    }
}
