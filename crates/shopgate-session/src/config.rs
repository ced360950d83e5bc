//! Hosted auth provider configuration.
//!
//! Loaded from the environment at start-up. Absence of `SHOPGATE_AUTH_URL`
//! is not an error: the gateway then runs without a hosted provider.

use url::Url;
use zeroize::Zeroizing;

/// Default request timeout against the hosted auth service.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for [`crate::HostedAuthProvider`].
///
/// Custom `Debug` implementation redacts the `api_key` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct HostedAuthConfig {
    /// Project base URL, e.g. `https://abc.auth.example.co`.
    pub base_url: Url,
    /// Public project API key sent as the `apikey` header.
    pub api_key: Zeroizing<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for HostedAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedAuthConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl HostedAuthConfig {
    /// Build a configuration from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_url("base_url", base_url)?,
            api_key: Zeroizing::new(api_key.into()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SHOPGATE_AUTH_URL` (optional; `Ok(None)` when unset)
    /// - `SHOPGATE_AUTH_ANON_KEY` (required when the URL is set)
    /// - `SHOPGATE_AUTH_TIMEOUT_SECS` (default: 10)
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Ok(raw_url) = std::env::var("SHOPGATE_AUTH_URL") else {
            return Ok(None);
        };
        let api_key =
            std::env::var("SHOPGATE_AUTH_ANON_KEY").map_err(|_| ConfigError::MissingApiKey)?;

        let timeout_secs = match std::env::var("SHOPGATE_AUTH_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Some(Self {
            base_url: parse_url("SHOPGATE_AUTH_URL", &raw_url)?,
            api_key: Zeroizing::new(api_key),
            timeout_secs,
        }))
    }

    /// Override the request timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Join `path` onto the base URL, keeping any base path prefix.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn parse_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SHOPGATE_AUTH_ANON_KEY is required when SHOPGATE_AUTH_URL is set")]
    MissingApiKey,
    #[error("SHOPGATE_AUTH_ANON_KEY is not a valid header value")]
    InvalidApiKey,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid SHOPGATE_AUTH_TIMEOUT_SECS: {0:?}")]
    InvalidTimeout(String),
}
