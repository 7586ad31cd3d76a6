//! Client configuration.
//!
//! Every resolver and server carries an explicit [`ClientConfig`]. The
//! process-wide default is only consulted where one of those is constructed,
//! by merging caller-supplied [`ResolveOptions`] over it.
//!
//! Default precedence: env vars > .env file > zion-sdk.toml > built-in defaults.

use serde::Deserialize;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

static DEFAULTS: RwLock<ClientConfig> = RwLock::new(ClientConfig::DEFAULT);

/// Effective connection policy for one resolver or server instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Allow plain `http://` endpoints. Must stay `false` in production.
    #[serde(default)]
    pub allow_http: bool,
    /// Request timeout in milliseconds; `0` means no timeout.
    #[serde(default)]
    pub timeout_ms: u64,
}

impl ClientConfig {
    pub const DEFAULT: Self = Self { allow_http: false, timeout_ms: 0 };

    /// The timeout to hand to the transport, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    /// Overlay explicitly set options on top of `self`.
    pub fn with_options(mut self, options: &ResolveOptions) -> Self {
        if let Some(allow_http) = options.allow_http {
            self.allow_http = allow_http;
        }
        if let Some(timeout_ms) = options.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Per-call overrides. Unset fields fall through to the next layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub allow_http: Option<bool>,
    pub timeout_ms: Option<u64>,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_http(mut self, allow: bool) -> Self {
        self.allow_http = Some(allow);
        self
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }

    /// Resolve these options against the current process default.
    pub fn effective(&self) -> ClientConfig {
        defaults().with_options(self)
    }
}

/// Current process-wide default configuration.
pub fn defaults() -> ClientConfig {
    *DEFAULTS.read().unwrap_or_else(PoisonError::into_inner)
}

/// Replace the process-wide default configuration.
pub fn set_defaults(config: ClientConfig) {
    *DEFAULTS.write().unwrap_or_else(PoisonError::into_inner) = config;
}

/// Restore the built-in defaults (`allow_http = false`, no timeout).
pub fn reset_defaults() {
    set_defaults(ClientConfig::DEFAULT);
}

/// Load the process-wide default from the environment and install it.
///
/// Reads `ZION__ALLOW_HTTP` and `ZION__TIMEOUT_MS`, an optional
/// `zion-sdk.toml` in the working directory, and a `.env` file if present.
pub fn init() -> Result<ClientConfig, config::ConfigError> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    let cfg = config::Config::builder()
        .set_default("allow_http", false)?
        .set_default("timeout_ms", 0)?
        .add_source(config::File::with_name("zion-sdk").required(false))
        .add_source(
            config::Environment::with_prefix("ZION")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let client: ClientConfig = cfg.try_deserialize()?;
    set_defaults(client);
    tracing::debug!(?client, "Installed process-wide client defaults");
    Ok(client)
}
