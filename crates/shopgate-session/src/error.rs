//! Session lookup errors.
//!
//! A rejected or missing token is not an error: providers return `Ok(None)`.
//! These variants cover the cases where the provider could not give an
//! answer at all.

use thiserror::Error;

use crate::config::ConfigError;

/// Failure to determine whether a session exists.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Transport failure (connect, timeout, TLS).
    #[error("session provider request failed at {endpoint}: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with an unexpected status.
    #[error("session provider returned {status} at {endpoint}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The provider answered 2xx with a body we could not read.
    #[error("session provider response at {endpoint} could not be decoded: {source}")]
    Deserialization {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The provider is known to be down.
    #[error("session provider unavailable: {0}")]
    Unavailable(String),

    /// The provider could not be constructed.
    #[error("session provider misconfigured: {0}")]
    Config(#[from] ConfigError),
}

impl SessionError {
    /// Short machine-readable kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http",
            Self::Api { .. } => "api",
            Self::Deserialization { .. } => "deserialization",
            Self::Unavailable(_) => "unavailable",
            Self::Config(_) => "config",
        }
    }
}
