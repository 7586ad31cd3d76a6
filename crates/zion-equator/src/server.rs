//! Entry point for Equator queries.

use std::sync::Arc;

use url::Url;
use zion_common::{ClientConfig, HttpTransport, ReqwestTransport, ResolveOptions};

use crate::builders::{
    Accounts, CallBuilder, Effects, Ledgers, Operations, Payments, Resource, Transactions,
};
use crate::error::{EquatorError, Result};

/// Handle to one Equator server. Hands out a fresh [`CallBuilder`] per query.
#[derive(Debug, Clone)]
pub struct EquatorServer {
    server_url: Url,
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
}

impl EquatorServer {
    /// Connect to `server_url` through the shared HTTP transport.
    ///
    /// Plain `http://` URLs are refused unless `allow_http` is set in
    /// `options` or in the process-wide defaults.
    pub fn new(server_url: &str, options: &ResolveOptions) -> Result<Self> {
        let transport = ReqwestTransport::shared()?;
        Self::with_transport(transport, server_url, options.effective())
    }

    pub fn with_transport(
        transport: Arc<dyn HttpTransport>,
        server_url: &str,
        config: ClientConfig,
    ) -> Result<Self> {
        let server_url = Url::parse(server_url)?;
        if server_url.scheme() != "https" && !config.allow_http {
            return Err(EquatorError::InsecureConnection { url: server_url.to_string() });
        }
        Ok(Self { server_url, config, transport })
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    pub fn config(&self) -> ClientConfig {
        self.config
    }

    pub fn accounts(&self) -> CallBuilder<Accounts> {
        self.builder()
    }

    pub fn effects(&self) -> CallBuilder<Effects> {
        self.builder()
    }

    pub fn ledgers(&self) -> CallBuilder<Ledgers> {
        self.builder()
    }

    pub fn payments(&self) -> CallBuilder<Payments> {
        self.builder()
    }

    pub fn transactions(&self) -> CallBuilder<Transactions> {
        self.builder()
    }

    pub fn operations(&self) -> CallBuilder<Operations> {
        self.builder()
    }

    fn builder<R: Resource>(&self) -> CallBuilder<R> {
        CallBuilder::new(self.server_url.clone(), Arc::clone(&self.transport), self.config.timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zion_common::testing::MockTransport;

    #[test]
    fn insecure_server_needs_opt_in() {
        let mock: Arc<dyn HttpTransport> = Arc::new(MockTransport::new());
        let err = EquatorServer::with_transport(mock.clone(), "http://localhost:8000", ClientConfig::DEFAULT)
            .unwrap_err();
        assert!(matches!(err, EquatorError::InsecureConnection { .. }));

        let config = ClientConfig { allow_http: true, timeout_ms: 0 };
        assert!(EquatorServer::with_transport(mock, "http://localhost:8000", config).is_ok());
    }
}
