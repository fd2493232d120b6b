//! HTTP client abstraction for testability

use std::future::Future;
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::types::SourceError;

/// Default HTTP timeout in seconds, matching the server-side query timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const USER_AGENT: &str = concat!("geoshard/", env!("CARGO_PKG_VERSION"));

/// Trait for asynchronous HTTP client operations.
///
/// Sources take the client as a type parameter so tests can substitute a
/// scripted implementation.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request and returns the response body.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, SourceError>> + Send;

    /// Performs an HTTP POST with a URL-encoded form body.
    fn post_form(
        &self,
        url: &str,
        fields: &[(&str, &str)],
    ) -> impl Future<Output = Result<Vec<u8>, SourceError>> + Send;
}

/// HTTP client backed by reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    pub fn new() -> Result<Self, SourceError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| SourceError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn read_body(response: reqwest::Response, url: &str) -> Result<Vec<u8>, SourceError> {
        let status = response.status();
        if !status.is_success() {
            warn!(url = url, status = status.as_u16(), "HTTP error status");
            return Err(SourceError::Transport(format!("HTTP {} from {}", status, url)));
        }

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = url, bytes = bytes.len(), "HTTP response body read");
                Ok(bytes.to_vec())
            }
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                Err(SourceError::Transport(format!(
                    "Failed to read response: {}",
                    e
                )))
            }
        }
    }
}

fn send_error(url: &str, e: reqwest::Error) -> SourceError {
    warn!(
        url = url,
        error = %e,
        is_connect = e.is_connect(),
        is_timeout = e.is_timeout(),
        "HTTP request failed"
    );
    SourceError::Transport(format!("Request failed: {}", e))
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        trace!(url = url, "HTTP GET request starting");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| send_error(url, e))?;
        debug!(url = url, status = response.status().as_u16(), "HTTP response received");

        Self::read_body(response, url).await
    }

    async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<Vec<u8>, SourceError> {
        trace!(url = url, "HTTP POST request starting");

        let response = self
            .client
            .post(url)
            .form(fields)
            .send()
            .await
            .map_err(|e| send_error(url, e))?;
        debug!(url = url, status = response.status().as_u16(), "HTTP response received");

        Self::read_body(response, url).await
    }
}
