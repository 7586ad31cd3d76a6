//! # zion-common
//!
//! Shared primitives for the Zion SDK crates: client configuration, the HTTP
//! GET transport abstraction (with its `reqwest` implementation), and StrKey
//! account identifiers. No protocol logic lives here.

pub mod config;
pub mod http;
pub mod strkey;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use config::{ClientConfig, ResolveOptions};
pub use http::{GetRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};
