//! # shopgate-api — Binary Entry Point
//!
//! Starts the gateway. Binds to `PORT` (default 8080).

use std::sync::Arc;

use shopgate_api::config::{AppConfig, LogFormat};
use shopgate_api::state::AppState;
use shopgate_session::{HostedAuthProvider, MemorySessionProvider, SessionProvider};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    // Initialize structured tracing.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    let provider: Arc<dyn SessionProvider> = match config.auth.clone() {
        Some(auth) => {
            tracing::info!(base_url = %auth.base_url, "hosted auth provider configured");
            Arc::new(HostedAuthProvider::new(auth).map_err(|e| {
                tracing::error!("Failed to create hosted auth provider: {e}");
                e
            })?)
        }
        None => {
            tracing::warn!(
                "SHOPGATE_AUTH_URL not set. Using the in-memory provider: every visitor is anonymous."
            );
            Arc::new(MemorySessionProvider::new())
        }
    };

    match &config.upstream_url {
        Some(url) => tracing::info!(upstream = %url, "forwarding allowed requests"),
        None => tracing::warn!("SHOPGATE_UPSTREAM_URL not set. Allowed requests will return 404."),
    }
    if let Some(dir) = &config.static_dir {
        tracing::info!(static_dir = %dir.display(), "serving asset paths from disk");
    }
    tracing::info!(
        lookup_failure = config.lookup_failure.as_str(),
        "session lookup failure policy"
    );

    let port = config.port;
    let state = AppState::with_config(config, provider)?;
    let app = shopgate_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("shopgate listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
