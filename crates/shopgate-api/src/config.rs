//! # Gateway Configuration
//!
//! Read once at startup from the environment. Every variable is optional;
//! an empty environment yields a gateway on port 8080 with the in-memory
//! session provider and no upstream.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `PORT` | `8080` | listen port |
//! | `SHOPGATE_UPSTREAM_URL` | unset | page renderer to forward allowed requests to |
//! | `SHOPGATE_UPSTREAM_TIMEOUT_SECS` | `30` | upstream request timeout |
//! | `SHOPGATE_STATIC_DIR` | unset | directory served for excluded asset paths |
//! | `SHOPGATE_LOOKUP_FAILURE` | `unavailable` | `unavailable` or `anonymous` |
//! | `SHOPGATE_LOG_FORMAT` | `text` | `text` or `json` |
//! | `SHOPGATE_AUTH_*` | unset | hosted auth service, see [`HostedAuthConfig`] |

use std::path::PathBuf;
use std::str::FromStr;

use shopgate_session::HostedAuthConfig;
use thiserror::Error;
use url::Url;

use crate::gate::LookupFailurePolicy;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format {other:?}, expected \"text\" or \"json\"")),
        }
    }
}

/// Errors reading gateway configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error(transparent)]
    Auth(#[from] shopgate_session::ConfigError),
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub upstream_url: Option<Url>,
    pub upstream_timeout_secs: u64,
    pub static_dir: Option<PathBuf>,
    pub lookup_failure: LookupFailurePolicy,
    pub log_format: LogFormat,
    /// Hosted auth service. `None` selects the in-memory provider.
    pub auth: Option<HostedAuthConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            upstream_url: None,
            upstream_timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            static_dir: None,
            lookup_failure: LookupFailurePolicy::default(),
            log_format: LogFormat::default(),
            auth: None,
        }
    }
}

impl AppConfig {
    /// Load configuration, hosted auth included, from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())?.with_auth_from_env()
    }

    /// Load the gateway variables through `lookup`. Blank values count as
    /// unset. Hosted auth is left unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = get("PORT") {
            config.port = raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                reason: e.to_string(),
            })?;
        }

        if let Some(raw) = get("SHOPGATE_UPSTREAM_URL") {
            let url = Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
                var: "SHOPGATE_UPSTREAM_URL",
                reason: e.to_string(),
            })?;
            config.upstream_url = Some(url);
        }

        if let Some(raw) = get("SHOPGATE_UPSTREAM_TIMEOUT_SECS") {
            config.upstream_timeout_secs =
                raw.trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::Invalid {
                        var: "SHOPGATE_UPSTREAM_TIMEOUT_SECS",
                        reason: e.to_string(),
                    })?;
        }

        config.static_dir = get("SHOPGATE_STATIC_DIR").map(PathBuf::from);

        if let Some(raw) = get("SHOPGATE_LOOKUP_FAILURE") {
            config.lookup_failure = raw.parse().map_err(|reason| ConfigError::Invalid {
                var: "SHOPGATE_LOOKUP_FAILURE",
                reason,
            })?;
        }

        if let Some(raw) = get("SHOPGATE_LOG_FORMAT") {
            config.log_format = raw.parse().map_err(|reason| ConfigError::Invalid {
                var: "SHOPGATE_LOG_FORMAT",
                reason,
            })?;
        }

        Ok(config)
    }

    /// Attach hosted auth configuration from the environment.
    pub fn with_auth_from_env(mut self) -> Result<Self, ConfigError> {
        self.auth = HostedAuthConfig::from_env()?;
        Ok(self)
    }
}
