//! Outbound HTTP to the model provider.
//!
//! The adapters only ever POST a JSON body to a path under the configured
//! base URL and read a JSON body back. [`Transport`] captures exactly that,
//! so the adapters and the tool-calling loop can be tested against a
//! scripted transport with no network access.

use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Why a provider request produced no usable response.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The request never got an HTTP response (DNS, TLS, timeout, ...).
    #[error("request failed: {0}")]
    Request(String),
    /// The provider answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    /// The body was not the JSON shape the adapter expected.
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("No response from API")]
    NoChoices,
}

/// Sends one JSON request and returns the JSON response.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, path: &str, body: Value) -> Result<Value, ProviderError>;
}

/// [`Transport`] over HTTPS with bearer authentication.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    /// Creates a transport rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, body), fields(url = %self.url(path)))]
    async fn post_json(&self, path: &str, body: Value) -> Result<Value, ProviderError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        debug!(status = status.as_u16(), body_len = text.len(), "provider responded");

        if !status.is_success() {
            warn!(status = status.as_u16(), "provider returned an error status");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

/// Pull `error.message` out of an OpenAI-style error body, falling back to
/// the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
