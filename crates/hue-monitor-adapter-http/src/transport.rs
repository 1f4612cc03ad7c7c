//! Transport seam and its `reqwest` implementation.

use reqwest::Client;
use std::future::Future;
use std::time::Duration;

/// Performs a GET for a URL and returns the raw response body.
///
/// An empty body is a successful response, not an error.
pub trait Transport {
    /// Fetch `url` and return its body as text.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on connection failure, timeout, or a
    /// non-success status.
    fn get(&self, url: &str) -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// HTTP transport configuration.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP/1.1 transport backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new transport.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: &HttpTransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .http1_only()
            .use_rustls_tls()
            .build()
            .map_err(|e| TransportError::Init(e.to_string()))?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, TransportError> {
        tracing::trace!(url, "GET");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(url.to_string())
            } else {
                TransportError::Request(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))
    }
}

/// Errors that can occur at the network layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Client initialization failed
    #[error("client init error: {0}")]
    Init(String),
    /// URL could not be built
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    /// Connection or protocol failure
    #[error("request error: {0}")]
    Request(String),
    /// Request exceeded the configured timeout
    #[error("request to {0} timed out")]
    Timeout(String),
    /// Service answered with a non-success status
    #[error("{url} returned status {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },
}

impl TransportError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Request(_) | TransportError::Timeout(_) | TransportError::Status { .. }
        )
    }
}
