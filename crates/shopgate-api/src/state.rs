//! # Application State
//!
//! Shared state for the Axum application, passed to the pass-through
//! fallback and the probes via the `State` extractor. The gate itself travels
//! as a request extension.

use std::sync::Arc;

use shopgate_session::{MemorySessionProvider, SessionProvider};
use tower_http::services::ServeDir;

use crate::config::AppConfig;
use crate::gate::AccessGate;
use crate::upstream::Upstream;

/// Errors building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to build upstream client: {0}")]
    Upstream(#[from] reqwest::Error),
}

/// Shared application state. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    pub gate: AccessGate,
    pub upstream: Option<Upstream>,
    pub static_files: Option<ServeDir>,
}

impl AppState {
    /// Default configuration with an empty in-memory provider.
    pub fn new() -> Self {
        Self {
            gate: AccessGate::new(Arc::new(MemorySessionProvider::new())),
            upstream: None,
            static_files: None,
        }
    }

    /// Build state from configuration and an already-constructed provider.
    pub fn with_config(
        config: AppConfig,
        provider: Arc<dyn SessionProvider>,
    ) -> Result<Self, StateError> {
        let gate = AccessGate::new(provider).with_policy(config.lookup_failure);

        let upstream = config
            .upstream_url
            .clone()
            .map(|url| Upstream::new(url, config.upstream_timeout_secs))
            .transpose()?;

        let static_files = config.static_dir.as_ref().map(ServeDir::new);

        Ok(Self {
            gate,
            upstream,
            static_files,
        })
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
