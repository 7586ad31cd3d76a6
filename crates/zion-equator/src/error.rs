//! Error types for the Equator query builders.

use thiserror::Error;
use zion_common::TransportError;

/// Errors raised while composing a request URL. No I/O is involved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("URL '{0}' cannot carry a path")]
    InvalidBaseUrl(String),

    /// Only raised under [`FilterPolicy::Strict`](crate::filter::FilterPolicy::Strict).
    #[error("Too many filters specified: {count}")]
    TooManyFilters { count: usize },
}

#[derive(Debug, Error)]
pub enum EquatorError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Cannot connect to insecure Equator server '{url}'")]
    InsecureConnection { url: String },

    #[error("Invalid Equator server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Server query failed. Server responded: {status} {status_text}")]
    BadResponse { status: u16, status_text: String, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, EquatorError>;
