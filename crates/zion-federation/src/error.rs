//! Federation-specific error types.

use std::fmt;

use thiserror::Error;
use zion_common::TransportError;

/// Which fetch ran into the response-size cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Descriptor,
    Federation,
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseSource::Descriptor => f.write_str("zion.toml file"),
            ResponseSource::Federation => f.write_str("federation response"),
        }
    }
}

/// Why an address was rejected before any request was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("not a valid account id")]
    InvalidAccountId,

    #[error("expected exactly one '*' separator")]
    SeparatorCount,

    #[error("name part is empty")]
    EmptyName,

    #[error("domain part is empty")]
    EmptyDomain,

    #[error("domain is not a valid host name")]
    InvalidDomain,
}

/// Errors that can occur while discovering or querying a federation server.
#[derive(Debug, Error)]
pub enum FederationError {
    // ── Input ───────────────────────────────────────────────────────────────

    #[error("Invalid Zion address '{address}': {reason}")]
    InvalidAddress { address: String, reason: AddressError },

    #[error(
        "Unknown domain. Make sure the address contains a domain (ex. `bob*zion.org`) \
         or bind a domain when constructing the resolver"
    )]
    UnknownDomain,

    // ── Endpoint policy ─────────────────────────────────────────────────────

    #[error("Cannot connect to insecure federation server '{url}'")]
    InsecureConnection { url: String },

    #[error("Invalid federation server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Descriptor ──────────────────────────────────────────────────────────

    #[error("Parsing error on line {line}, column {column}: {message}")]
    DescriptorParse { line: usize, column: usize, message: String },

    #[error("zion.toml does not contain {field} field")]
    DescriptorFieldMissing { field: &'static str },

    // ── Responses ───────────────────────────────────────────────────────────

    #[error("{origin} exceeds allowed size of {limit}")]
    ResponseTooLarge { origin: ResponseSource, limit: usize },

    #[error("Server query failed. Server responded: {status} {status_text}")]
    BadResponse { status: u16, status_text: String, body: String },

    #[error("memo value should be of type string, got {found}")]
    MemoType { found: &'static str },

    #[error("Malformed federation response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    // ── Transport ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Transport(TransportError),
}

impl FederationError {
    /// Map a transport failure, rewriting only the size-cap case.
    pub(crate) fn from_transport(err: TransportError, origin: ResponseSource) -> Self {
        match err {
            TransportError::BodyTooLarge { limit } => FederationError::ResponseTooLarge { origin, limit },
            other => FederationError::Transport(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_size_cap_is_rewritten() {
        let err = FederationError::from_transport(
            TransportError::BodyTooLarge { limit: 102_400 },
            ResponseSource::Federation,
        );
        assert_eq!(err.to_string(), "federation response exceeds allowed size of 102400");

        let err = FederationError::from_transport(TransportError::Timeout, ResponseSource::Descriptor);
        assert!(matches!(err, FederationError::Transport(TransportError::Timeout)));
    }

    #[test]
    fn descriptor_messages() {
        let err = FederationError::DescriptorParse { line: 3, column: 7, message: "expected `=`".into() };
        assert_eq!(err.to_string(), "Parsing error on line 3, column 7: expected `=`");

        let err = FederationError::DescriptorFieldMissing { field: "FEDERATION_SERVER" };
        assert_eq!(err.to_string(), "zion.toml does not contain FEDERATION_SERVER field");
    }
}
