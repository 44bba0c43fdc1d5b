use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use crate::ports::{HttpTransport, TransportError, TransportResponse};

/// HTTP transport backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("apiwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<TransportResponse, TransportError> {
        let url = Url::parse(url).map_err(|e| TransportError::InvalidUrl(format!("{url}: {e}")))?;
        let start = Instant::now();

        let request = async {
            let response = self.client.get(url.clone()).send().await?;
            let status_code = response.status().as_u16();
            // Drain the body so the timing covers the full transfer
            response.bytes().await?;
            Ok::<_, reqwest::Error>(status_code)
        };

        match tokio::time::timeout(timeout, request).await {
            Ok(Ok(status_code)) => Ok(TransportResponse {
                status_code,
                elapsed: start.elapsed(),
            }),
            Ok(Err(e)) => {
                debug!(%url, error = %e, "request failed");
                Err(TransportError::Network(e.to_string()))
            }
            Err(_) => {
                debug!(%url, ?timeout, "request timed out");
                Err(TransportError::Timeout(timeout))
            }
        }
    }
}
