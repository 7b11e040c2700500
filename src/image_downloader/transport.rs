//! HTTP transport seam for the downloader

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use std::time::Duration;
use thiserror::Error;

/// Error type for a single download attempt
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Response body as a stream of chunks
pub type BodyStream = BoxStream<'static, Result<Vec<u8>, DownloadError>>;

/// Status line, content type and a not-yet-consumed body
pub struct TransportResponse {
    pub status: u16,
    /// `Content-Type` header value, empty when absent
    pub content_type: String,
    pub body: BodyStream,
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Issues GET requests for image URLs
#[async_trait]
pub trait ImageTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<TransportResponse, DownloadError>;
}

/// `reqwest`-backed transport sending browser-like headers
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    user_agent: String,
    timeout: Duration,
}

impl ReqwestTransport {
    /// # Errors
    /// Fails when the TLS backend cannot be initialised.
    pub fn new(user_agent: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            client,
            user_agent: user_agent.into(),
            timeout,
        })
    }
}

#[async_trait]
impl ImageTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, DownloadError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "image/avif,image/webp,image/apng,image/*,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DownloadError::Timeout(self.timeout)
                } else {
                    DownloadError::Transport(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let body = response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| DownloadError::Transport(e.to_string()))
            })
            .boxed();

        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}
