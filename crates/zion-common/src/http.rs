//! HTTP GET transport.
//!
//! Resolvers and call builders only speak to [`HttpTransport`]; they never see
//! `reqwest` directly. The transport enforces the response-size cap and the
//! timeout, and reports a cap violation as [`TransportError::BodyTooLarge`] so
//! callers can tell it apart from every other failure.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;
use url::Url;

static SHARED: OnceLock<Arc<ReqwestTransport>> = OnceLock::new();

// ─── Request / response ──────────────────────────────────────────────────────

/// A single GET request.
#[derive(Debug, Clone)]
pub struct GetRequest {
    pub url: Url,
    /// Maximum accepted body size in bytes. `None` accepts any size.
    pub max_bytes: Option<usize>,
    /// `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl GetRequest {
    pub fn new(url: Url) -> Self {
        Self { url, max_bytes: None, timeout: None }
    }

    pub fn max_bytes(mut self, limit: usize) -> Self {
        self.max_bytes = Some(limit);
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A fully buffered response. Non-2xx statuses are returned here, not as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    /// The body (or its advertised `Content-Length`) exceeded the request cap.
    #[error("response body exceeds the limit of {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() { TransportError::Timeout } else { TransportError::Http(e) }
    }
}

// ─── Transport ───────────────────────────────────────────────────────────────

#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    async fn get(&self, request: GetRequest) -> Result<HttpResponse, TransportError>;
}

/// Default transport backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("zion-sdk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one configured with a proxy.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Process-wide transport, built on first use.
    pub fn shared() -> Result<Arc<dyn HttpTransport>, TransportError> {
        if let Some(transport) = SHARED.get() {
            return Ok(transport.clone());
        }
        let transport = Arc::new(Self::new()?);
        Ok(SHARED.get_or_init(|| transport).clone())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: GetRequest) -> Result<HttpResponse, TransportError> {
        debug!("GET {}", request.url);
        let mut builder = self.client.get(request.url);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        let mut resp = builder.send().await?;
        let status = resp.status();

        if let (Some(limit), Some(len)) = (request.max_bytes, resp.content_length()) {
            if len > limit as u64 {
                return Err(TransportError::BodyTooLarge { limit });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await? {
            if let Some(limit) = request.max_bytes {
                if body.len() + chunk.len() > limit {
                    return Err(TransportError::BodyTooLarge { limit });
                }
            }
            body.extend_from_slice(&chunk);
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            body,
        })
    }
}
