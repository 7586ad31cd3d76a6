//! # zion-federation
//!
//! Resolves payment destinations for the Zion ledger.
//!
//! ## Flow
//!
//! ```text
//!  caller                    acme.com                         fed.acme.com
//!    │  resolve("bob*acme.com")  │                                  │
//!    ├── GET /.well-known/zion.toml ─►│                             │
//!    │◄── FEDERATION_SERVER = "https://fed.acme.com/federation" ─┤  │
//!    ├── GET /federation?type=name&q=bob*acme.com ──────────────────►│
//!    │◄── { "account_id": "G...", "memo_type": "text", "memo": "…" } ─┤
//! ```
//!
//! - **Addresses** (`address.rs`): `name*domain` or a raw StrKey account id.
//! - **Descriptors** (`descriptor.rs`): fetches and parses a domain's
//!   `zion.toml`, capped at 100 KiB.
//! - **Resolver** (`resolver.rs`): discovers the federation endpoint and runs
//!   `name` / `id` / `txid` lookups, validating the memo on every response.

pub mod address;
pub mod descriptor;
pub mod error;
pub mod resolver;
pub mod types;

pub use address::Address;
pub use descriptor::{Descriptor, DescriptorResolver};
pub use error::{AddressError, FederationError, ResponseSource};
pub use resolver::{FederationResolver, LookupType};
pub use types::{FederationRecord, MemoType};
