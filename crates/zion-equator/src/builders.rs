//! Fluent call builders for Equator resources.
//!
//! There is one builder type, [`CallBuilder<R>`], parameterised by a resource
//! marker. Each resource's `impl` block below is its table of supported
//! filters; every filter appends one filter-group (see [`crate::filter`]).
//!
//! ```rust
//! use std::sync::Arc;
//! use zion_common::{testing::MockTransport, ClientConfig};
//! use zion_equator::{EquatorServer, Order};
//!
//! let server = EquatorServer::with_transport(
//!     Arc::new(MockTransport::new()),
//!     "https://equator.zion.org",
//!     ClientConfig::DEFAULT,
//! )
//! .unwrap();
//!
//! let url = server.payments().for_account("GABC").order(Order::Desc).limit(20).url().unwrap();
//! assert_eq!(url.as_str(), "https://equator.zion.org/accounts/GABC/payments?order=desc&limit=20");
//! ```

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;
use zion_common::{GetRequest, HttpTransport};

use crate::error::{EquatorError, Result};
use crate::filter::{FilterPolicy, Order, QueryFilter, Segment};

/// A listable Equator resource.
pub trait Resource {
    /// Path segment of the unfiltered listing.
    const SEGMENT: &'static str;
}

macro_rules! resources {
    ($($(#[$meta:meta])* $name:ident => $segment:literal),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub struct $name;

            impl Resource for $name {
                const SEGMENT: &'static str = $segment;
            }
        )*
    };
}

resources! {
    /// `/accounts`
    Accounts => "accounts",
    /// `/effects`
    Effects => "effects",
    /// `/ledgers`
    Ledgers => "ledgers",
    /// `/payments`
    Payments => "payments",
    /// `/transactions`
    Transactions => "transactions",
    /// `/operations`
    Operations => "operations",
}

/// `[a.into(), b.into(), ...]` as `[Segment; N]`
macro_rules! segments {
    ($($s:expr),+ $(,)?) => {
        [$(Into::<Segment>::into($s)),+]
    };
}

// ── Builder ───────────────────────────────────────────────────────────────────

pub struct CallBuilder<R: Resource> {
    server_url: Url,
    transport: Arc<dyn HttpTransport>,
    timeout: Option<Duration>,
    query: QueryFilter,
    _resource: PhantomData<R>,
}

impl<R: Resource> Clone for CallBuilder<R> {
    fn clone(&self) -> Self {
        Self {
            server_url: self.server_url.clone(),
            transport: Arc::clone(&self.transport),
            timeout: self.timeout,
            query: self.query.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> std::fmt::Debug for CallBuilder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallBuilder")
            .field("resource", &R::SEGMENT)
            .field("server_url", &self.server_url.as_str())
            .field("query", &self.query)
            .finish()
    }
}

impl<R: Resource> CallBuilder<R> {
    pub(crate) fn new(server_url: Url, transport: Arc<dyn HttpTransport>, timeout: Option<Duration>) -> Self {
        Self { server_url, transport, timeout, query: QueryFilter::new(), _resource: PhantomData }
    }

    /// Paging token to start from.
    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.query.set_param("cursor", cursor.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.query.set_param("limit", limit);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.query.set_param("order", order.as_str());
        self
    }

    /// Any other query parameter the endpoint understands.
    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.set_param(key, value);
        self
    }

    pub fn filter_policy(mut self, policy: FilterPolicy) -> Self {
        self.query.set_policy(policy);
        self
    }

    fn filter<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment>,
    {
        self.query.push_filter(segments);
        self
    }

    /// The URL [`call`](Self::call) would request.
    pub fn url(&self) -> Result<Url> {
        Ok(self.query.compose(&self.server_url, R::SEGMENT)?)
    }

    /// Execute the request and decode the JSON body.
    pub async fn call<T: DeserializeOwned>(&self) -> Result<T> {
        let url = self.url()?;
        debug!("Equator GET {}", url);

        let resp = self.transport.get(GetRequest::new(url).timeout(self.timeout)).await?;
        if !resp.is_success() {
            return Err(EquatorError::BadResponse {
                status: resp.status,
                status_text: resp.status_text.clone(),
                body: resp.text(),
            });
        }
        Ok(serde_json::from_slice(&resp.body)?)
    }
}

// ── Resource filter tables ────────────────────────────────────────────────────

impl CallBuilder<Accounts> {
    /// A single account.
    pub fn account_id(self, id: &str) -> Self {
        self.filter(["accounts", id])
    }
}

impl CallBuilder<Effects> {
    pub fn for_account(self, account_id: &str) -> Self {
        self.filter(["accounts", account_id, "effects"])
    }

    pub fn for_ledger(self, sequence: impl Into<Segment>) -> Self {
        self.filter(segments!["ledgers", sequence, "effects"])
    }

    pub fn for_transaction(self, transaction_id: &str) -> Self {
        self.filter(["transactions", transaction_id, "effects"])
    }

    pub fn for_operation(self, operation_id: impl Into<Segment>) -> Self {
        self.filter(segments!["operations", operation_id, "effects"])
    }
}

impl CallBuilder<Ledgers> {
    /// A single ledger.
    pub fn ledger(self, sequence: impl Into<Segment>) -> Self {
        self.filter(segments!["ledgers", sequence])
    }
}

impl CallBuilder<Payments> {
    /// Payments the account sent or received.
    pub fn for_account(self, account_id: &str) -> Self {
        self.filter(["accounts", account_id, "payments"])
    }

    pub fn for_ledger(self, sequence: impl Into<Segment>) -> Self {
        self.filter(segments!["ledgers", sequence, "payments"])
    }

    pub fn for_transaction(self, transaction_id: &str) -> Self {
        self.filter(["transactions", transaction_id, "payments"])
    }

    pub fn include_failed(self, include: bool) -> Self {
        self.param("include_failed", include)
    }
}

impl CallBuilder<Transactions> {
    /// A single transaction.
    pub fn transaction(self, transaction_id: &str) -> Self {
        self.filter(["transactions", transaction_id])
    }

    pub fn for_account(self, account_id: &str) -> Self {
        self.filter(["accounts", account_id, "transactions"])
    }

    pub fn for_ledger(self, sequence: impl Into<Segment>) -> Self {
        self.filter(segments!["ledgers", sequence, "transactions"])
    }

    pub fn include_failed(self, include: bool) -> Self {
        self.param("include_failed", include)
    }
}

impl CallBuilder<Operations> {
    /// A single operation.
    pub fn operation(self, operation_id: impl Into<Segment>) -> Self {
        self.filter(segments!["operations", operation_id])
    }

    pub fn for_account(self, account_id: &str) -> Self {
        self.filter(["accounts", account_id, "operations"])
    }

    pub fn for_ledger(self, sequence: impl Into<Segment>) -> Self {
        self.filter(segments!["ledgers", sequence, "operations"])
    }

    pub fn for_transaction(self, transaction_id: &str) -> Self {
        self.filter(["transactions", transaction_id, "operations"])
    }

    pub fn include_failed(self, include: bool) -> Self {
        self.param("include_failed", include)
    }
}
