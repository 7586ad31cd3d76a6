//! `zion.toml` discovery.
//!
//! A domain advertises its service endpoints in a TOML file served from
//! `https://<domain>/.well-known/zion.toml`. Every call fetches the file again;
//! nothing is cached.

use std::str::FromStr;

use tracing::debug;
use url::Url;
use zion_common::{ClientConfig, GetRequest, HttpTransport, ReqwestTransport, ResolveOptions};

use crate::error::{AddressError, FederationError, ResponseSource};

/// Maximum accepted size of a `zion.toml` file.
pub const DESCRIPTOR_MAX_SIZE: usize = 100 * 1024;

pub const DESCRIPTOR_PATH: &str = "/.well-known/zion.toml";

/// Key holding the federation endpoint URL.
pub const FEDERATION_SERVER: &str = "FEDERATION_SERVER";

// ─── Descriptor ──────────────────────────────────────────────────────────────

/// A parsed `zion.toml` file.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    table: toml::Table,
}

impl Descriptor {
    /// Parse raw bytes. Errors carry a 1-based line and column.
    pub fn parse(bytes: &[u8]) -> Result<Self, FederationError> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            // The prefix up to `valid_up_to` is known to be UTF-8.
            let valid = std::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default();
            let (line, column) = line_column(valid, valid.len());
            FederationError::DescriptorParse { line, column, message: e.to_string() }
        })?;
        text.parse()
    }

    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.table.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(toml::Value::as_str)
    }

    /// `FEDERATION_SERVER`, if present as a non-empty string.
    pub fn federation_server(&self) -> Option<&str> {
        self.get_str(FEDERATION_SERVER).filter(|s| !s.is_empty())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    pub fn as_table(&self) -> &toml::Table {
        &self.table
    }

    pub fn into_table(self) -> toml::Table {
        self.table
    }
}

impl FromStr for Descriptor {
    type Err = FederationError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let table = text.parse::<toml::Table>().map_err(|e| {
            let offset = e.span().map_or(0, |span| span.start);
            let (line, column) = line_column(text, offset);
            FederationError::DescriptorParse { line, column, message: e.message().trim_end().to_owned() }
        })?;
        Ok(Self { table })
    }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Fetches and parses `zion.toml` files.
pub struct DescriptorResolver;

impl DescriptorResolver {
    /// Resolve `domain`'s descriptor using the shared HTTP transport.
    ///
    /// `options` are merged over the process-wide defaults.
    pub async fn resolve(domain: &str, options: &ResolveOptions) -> Result<Descriptor, FederationError> {
        let transport = ReqwestTransport::shared().map_err(FederationError::Transport)?;
        Self::resolve_with(transport.as_ref(), domain, options.effective()).await
    }

    /// Resolve with an explicit transport and already-effective configuration.
    pub async fn resolve_with(
        transport: &dyn HttpTransport,
        domain: &str,
        config: ClientConfig,
    ) -> Result<Descriptor, FederationError> {
        let url = descriptor_url(domain, config.allow_http)?;
        debug!("Fetching zion.toml for {} from {}", domain, url);

        let request = GetRequest::new(url).max_bytes(DESCRIPTOR_MAX_SIZE).timeout(config.timeout());
        let resp = transport
            .get(request)
            .await
            .map_err(|e| FederationError::from_transport(e, ResponseSource::Descriptor))?;

        if !resp.is_success() {
            return Err(FederationError::BadResponse {
                status: resp.status,
                status_text: resp.status_text.clone(),
                body: resp.text(),
            });
        }

        let descriptor = Descriptor::parse(&resp.body)?;
        debug!("zion.toml for {} has {} keys", domain, descriptor.as_table().len());
        Ok(descriptor)
    }
}

/// `https://<domain>/.well-known/zion.toml`, or `http` when insecure is allowed.
///
/// A domain that does not form a valid URL host is an address error.
pub fn descriptor_url(domain: &str, allow_http: bool) -> Result<Url, FederationError> {
    let scheme = if allow_http { "http" } else { "https" };
    let invalid = |reason| FederationError::InvalidAddress { address: domain.to_owned(), reason };
    if domain.is_empty() {
        return Err(invalid(AddressError::EmptyDomain));
    }
    Url::parse(&format!("{scheme}://{domain}{DESCRIPTOR_PATH}"))
        .ok()
        .filter(|url| url.path() == DESCRIPTOR_PATH)
        .ok_or_else(|| invalid(AddressError::InvalidDomain))
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// 1-based line and column of byte `offset` in `text`.
fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let before = text.get(..offset).unwrap_or(text);
    let line = before.matches('\n').count() + 1;
    let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zion_common::testing::MockTransport;
    use zion_common::TransportError;

    const ACME_TOML: &str = "https://acme.com/.well-known/zion.toml";

    fn secure() -> ClientConfig {
        ClientConfig::DEFAULT
    }

    #[test]
    fn parses_descriptor() {
        let d: Descriptor = r#"
FEDERATION_SERVER = "https://fed.acme.com/federation"
SIGNING_KEY = "GABC"

[DOCUMENTATION]
ORG_NAME = "Acme"
"#
        .parse()
        .unwrap();

        assert_eq!(d.federation_server(), Some("https://fed.acme.com/federation"));
        assert_eq!(d.get_str("SIGNING_KEY"), Some("GABC"));
        assert!(d.get("DOCUMENTATION").unwrap().is_table());
        assert_eq!(d.keys().count(), 3);
    }

    #[test]
    fn empty_or_non_string_federation_server_counts_as_missing() {
        let d: Descriptor = "FEDERATION_SERVER = \"\"".parse().unwrap();
        assert_eq!(d.federation_server(), None);
        let d: Descriptor = "FEDERATION_SERVER = 42".parse().unwrap();
        assert_eq!(d.federation_server(), None);
    }

    #[test]
    fn parse_error_reports_position() {
        let err = "A = 1\nB = \"ok\"\nC = = 3\n".parse::<Descriptor>().unwrap_err();
        match err {
            FederationError::DescriptorParse { line, column, .. } => {
                assert_eq!(line, 3);
                assert!(column > 1, "column should point inside line 3, got {column}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let err = Descriptor::parse(b"A = 1\nB = \"\xff\"").unwrap_err();
        assert!(matches!(err, FederationError::DescriptorParse { line: 2, column: 6, .. }));
    }

    #[test]
    fn line_column_counts_chars() {
        assert_eq!(line_column("", 0), (1, 1));
        assert_eq!(line_column("ab\ncd", 4), (2, 2));
        assert_eq!(line_column("é = x", 3), (1, 3));
    }

    #[test]
    fn descriptor_url_scheme() {
        assert_eq!(descriptor_url("acme.com", false).unwrap().as_str(), ACME_TOML);
        assert_eq!(
            descriptor_url("acme.com", true).unwrap().as_str(),
            "http://acme.com/.well-known/zion.toml"
        );
    }

    #[test]
    fn unusable_domain_is_an_address_error() {
        let reason = |domain: &str| match descriptor_url(domain, false) {
            Err(FederationError::InvalidAddress { reason, .. }) => reason,
            other => panic!("expected InvalidAddress for {domain:?}, got {other:?}"),
        };
        assert_eq!(reason(""), AddressError::EmptyDomain);
        assert_eq!(reason("acme com"), AddressError::InvalidDomain);
        assert_eq!(reason("acme.com/evil"), AddressError::InvalidDomain);

        let err = descriptor_url("acme com", false).unwrap_err();
        assert_eq!(err.to_string(), "Invalid Zion address 'acme com': domain is not a valid host name");
    }

    #[tokio::test]
    async fn bad_domain_fails_before_any_request() {
        let mock = MockTransport::new();
        let err = DescriptorResolver::resolve_with(&mock, "acme com", secure()).await.unwrap_err();
        assert!(matches!(
            err,
            FederationError::InvalidAddress { reason: AddressError::InvalidDomain, .. }
        ));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn resolves_over_https_with_cap_and_timeout() {
        let mock = MockTransport::new().ok(ACME_TOML, "FEDERATION_SERVER = \"https://fed.acme.com\"");
        let config = ClientConfig { allow_http: false, timeout_ms: 2_000 };

        let d = DescriptorResolver::resolve_with(&mock, "acme.com", config).await.unwrap();
        assert_eq!(d.federation_server(), Some("https://fed.acme.com"));

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_bytes, Some(DESCRIPTOR_MAX_SIZE));
        assert_eq!(requests[0].timeout, Some(std::time::Duration::from_millis(2_000)));
    }

    #[tokio::test]
    async fn uses_http_when_allowed() {
        let mock = MockTransport::new().ok("http://acme.com/.well-known/zion.toml", "X = 1");
        let config = ClientConfig { allow_http: true, timeout_ms: 0 };

        DescriptorResolver::resolve_with(&mock, "acme.com", config).await.unwrap();
        assert_eq!(mock.requests()[0].timeout, None);
    }

    #[tokio::test]
    async fn oversized_descriptor_is_rewritten() {
        let mock = MockTransport::new().ok(ACME_TOML, vec![b'#'; DESCRIPTOR_MAX_SIZE + 1]);
        let err = DescriptorResolver::resolve_with(&mock, "acme.com", secure()).await.unwrap_err();
        assert!(matches!(
            err,
            FederationError::ResponseTooLarge { origin: ResponseSource::Descriptor, limit: DESCRIPTOR_MAX_SIZE }
        ));
        assert_eq!(err.to_string(), "zion.toml file exceeds allowed size of 102400");
    }

    #[tokio::test]
    async fn other_transport_errors_pass_through() {
        let mock = MockTransport::new().fail(ACME_TOML, "dns failure");
        let err = DescriptorResolver::resolve_with(&mock, "acme.com", secure()).await.unwrap_err();
        assert!(matches!(err, FederationError::Transport(TransportError::Other(m)) if m == "dns failure"));
    }

    #[tokio::test]
    async fn missing_descriptor_is_a_bad_response() {
        let mock = MockTransport::new();
        let err = DescriptorResolver::resolve_with(&mock, "acme.com", secure()).await.unwrap_err();
        assert!(matches!(err, FederationError::BadResponse { status: 404, .. }));
    }

    #[tokio::test]
    async fn repeated_resolution_refetches() {
        let mock = MockTransport::new().ok(ACME_TOML, "X = 1");
        DescriptorResolver::resolve_with(&mock, "acme.com", secure()).await.unwrap();
        DescriptorResolver::resolve_with(&mock, "acme.com", secure()).await.unwrap();
        assert_eq!(mock.request_count(), 2);
    }
}
