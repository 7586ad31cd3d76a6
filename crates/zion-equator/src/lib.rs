//! # zion-equator
//!
//! Builds and executes queries against the Equator HTTP API without
//! hand-assembling URLs.
//!
//! - **Filter composition** (`filter.rs`): turns accumulated filter-groups and
//!   query parameters into one URL; the last filter-group wins.
//! - **Call builders** (`builders.rs`): one generic builder with a filter table
//!   per resource (accounts, effects, ledgers, payments, transactions,
//!   operations).
//! - **Server** (`server.rs`): the entry point handing out builders.

pub mod builders;
pub mod error;
pub mod filter;
pub mod server;

pub use builders::CallBuilder;
pub use error::{EquatorError, QueryError, Result};
pub use filter::{FilterPolicy, Order, QueryFilter, Segment};
pub use server::EquatorServer;
