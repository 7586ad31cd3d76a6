//! Federation server client.
//!
//! A [`FederationResolver`] is bound to one federation endpoint (usually found
//! through the domain's `zion.toml`) and answers three lookups: by address,
//! by account id, and by transaction id. Each lookup is a single GET; nothing
//! is retried or cached, so concurrent calls never share request state.
//!
//! ```rust,no_run
//! use zion_common::ResolveOptions;
//! use zion_federation::FederationResolver;
//!
//! # async fn run() -> Result<(), zion_federation::FederationError> {
//! let record = FederationResolver::resolve("bob*acme.com", &ResolveOptions::default()).await?;
//! println!("pay to {}", record.account_id);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use url::Url;
use zion_common::{ClientConfig, GetRequest, HttpTransport, ReqwestTransport, ResolveOptions};

use crate::{
    address::{Address, SEPARATOR},
    descriptor::{DescriptorResolver, FEDERATION_SERVER},
    error::{FederationError, ResponseSource},
    types::FederationRecord,
};

/// Maximum accepted size of a federation server response.
pub const FEDERATION_RESPONSE_MAX_SIZE: usize = 100 * 1024;

/// The `type` query parameter of a federation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupType {
    Name,
    Id,
    Txid,
}

impl LookupType {
    pub fn as_str(self) -> &'static str {
        match self {
            LookupType::Name => "name",
            LookupType::Id => "id",
            LookupType::Txid => "txid",
        }
    }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Client for a single federation server.
///
/// Cheap to clone; clones share the transport and the immutable endpoint.
#[derive(Debug, Clone)]
pub struct FederationResolver {
    server_url: Url,
    domain: Option<String>,
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
}

impl FederationResolver {
    /// Bind to `server_url` using the shared HTTP transport.
    ///
    /// Fails with [`FederationError::InsecureConnection`] for non-`https`
    /// endpoints unless `allow_http` is set in `options` or the process default.
    pub fn new(
        server_url: &str,
        domain: Option<&str>,
        options: &ResolveOptions,
    ) -> Result<Self, FederationError> {
        let transport = ReqwestTransport::shared().map_err(FederationError::Transport)?;
        Self::with_transport(transport, server_url, domain, options.effective())
    }

    pub fn with_transport(
        transport: Arc<dyn HttpTransport>,
        server_url: &str,
        domain: Option<&str>,
        config: ClientConfig,
    ) -> Result<Self, FederationError> {
        let server_url = Url::parse(server_url)?;
        if server_url.scheme() != "https" && !config.allow_http {
            return Err(FederationError::InsecureConnection { url: server_url.to_string() });
        }
        Ok(Self { server_url, domain: domain.map(str::to_owned), config, transport })
    }

    // ── Entry points ─────────────────────────────────────────────────────────

    /// Resolve a destination that is either an account id or a `name*domain`
    /// address.
    ///
    /// Account ids come back as-is without any network traffic; addresses are
    /// looked up through the federation server advertised in the domain's
    /// `zion.toml`.
    pub async fn resolve(value: &str, options: &ResolveOptions) -> Result<FederationRecord, FederationError> {
        let address = Address::parse(value)?;
        if let Address::AccountId(id) = address {
            return Ok(FederationRecord::account(id));
        }
        let transport = ReqwestTransport::shared().map_err(FederationError::Transport)?;
        Self::resolve_parsed(transport, address, options.effective()).await
    }

    pub async fn resolve_with(
        transport: Arc<dyn HttpTransport>,
        value: &str,
        config: ClientConfig,
    ) -> Result<FederationRecord, FederationError> {
        let address = Address::parse(value)?;
        Self::resolve_parsed(transport, address, config).await
    }

    async fn resolve_parsed(
        transport: Arc<dyn HttpTransport>,
        address: Address,
        config: ClientConfig,
    ) -> Result<FederationRecord, FederationError> {
        match address {
            Address::AccountId(id) => Ok(FederationRecord::account(id)),
            Address::Federated { ref domain, .. } => {
                let resolver = Self::create_for_domain_with(transport, domain, config).await?;
                resolver.resolve_address(&address.to_string()).await
            }
        }
    }

    /// Build a resolver from the `FEDERATION_SERVER` entry of `domain`'s
    /// `zion.toml`.
    pub async fn create_for_domain(domain: &str, options: &ResolveOptions) -> Result<Self, FederationError> {
        let transport = ReqwestTransport::shared().map_err(FederationError::Transport)?;
        Self::create_for_domain_with(transport, domain, options.effective()).await
    }

    pub async fn create_for_domain_with(
        transport: Arc<dyn HttpTransport>,
        domain: &str,
        config: ClientConfig,
    ) -> Result<Self, FederationError> {
        let descriptor = DescriptorResolver::resolve_with(transport.as_ref(), domain, config).await?;
        let server_url = descriptor
            .federation_server()
            .ok_or(FederationError::DescriptorFieldMissing { field: FEDERATION_SERVER })?;
        debug!("Discovery (zion.toml): {} → {}", domain, server_url);
        Self::with_transport(transport, server_url, Some(domain), config)
    }

    // ── Lookups ──────────────────────────────────────────────────────────────

    /// Look up a federation address. A bare name (`bob`) is qualified with the
    /// bound domain.
    pub async fn resolve_address(&self, address: &str) -> Result<FederationRecord, FederationError> {
        let address = if address.contains(SEPARATOR) {
            address.to_owned()
        } else {
            let domain = self.domain.as_deref().ok_or(FederationError::UnknownDomain)?;
            format!("{address}{SEPARATOR}{domain}")
        };
        self.lookup(LookupType::Name, &address).await
    }

    /// Reverse lookup: which address belongs to `account_id`.
    pub async fn resolve_account_id(&self, account_id: &str) -> Result<FederationRecord, FederationError> {
        self.lookup(LookupType::Id, account_id).await
    }

    /// Who sent `transaction_id`, as known to this federation server.
    pub async fn resolve_transaction_id(&self, transaction_id: &str) -> Result<FederationRecord, FederationError> {
        self.lookup(LookupType::Txid, transaction_id).await
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn config(&self) -> ClientConfig {
        self.config
    }

    // ── Request path ─────────────────────────────────────────────────────────

    /// Endpoint URL for one lookup; any query already on the endpoint is replaced.
    pub fn lookup_url(&self, kind: LookupType, q: &str) -> Url {
        let mut url = self.server_url.clone();
        url.query_pairs_mut().clear().append_pair("type", kind.as_str()).append_pair("q", q);
        url
    }

    async fn lookup(&self, kind: LookupType, q: &str) -> Result<FederationRecord, FederationError> {
        let url = self.lookup_url(kind, q);
        debug!("Federation GET {}", url);

        let request = GetRequest::new(url)
            .max_bytes(FEDERATION_RESPONSE_MAX_SIZE)
            .timeout(self.config.timeout());
        let resp = self
            .transport
            .get(request)
            .await
            .map_err(|e| FederationError::from_transport(e, ResponseSource::Federation))?;

        if !resp.is_success() {
            return Err(FederationError::BadResponse {
                status: resp.status,
                status_text: resp.status_text.clone(),
                body: resp.text(),
            });
        }

        let value: Value = serde_json::from_slice(&resp.body)?;
        check_memo(&value)?;
        Ok(serde_json::from_value(value)?)
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// A present `memo` must be a JSON string, whatever the memo type.
fn check_memo(value: &Value) -> Result<(), FederationError> {
    match value.get("memo") {
        None | Some(Value::String(_)) => Ok(()),
        Some(other) => Err(FederationError::MemoType { found: json_type(other) }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
