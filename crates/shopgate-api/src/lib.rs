//! # shopgate-api — Storefront Access Gateway
//!
//! Sits in front of the storefront's page renderer and decides, for every
//! navigation, whether the request proceeds, is sent to the login page, or
//! is sent home. Lookups go through an injected
//! [`SessionProvider`](shopgate_session::SessionProvider); the route policy
//! comes from [`shopgate_core`].
//!
//! ## Surface
//!
//! | Path                 | Handler                    | Gated |
//! |----------------------|----------------------------|-------|
//! | `/health/liveness`   | [`liveness`]               | no    |
//! | `/health/readiness`  | [`readiness`]              | no    |
//! | everything else      | [`upstream::pass_through`] | yes   |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AccessGate → pass-through (static dir | upstream | 404)
//! ```

pub mod config;
pub mod cookies;
pub mod error;
pub mod gate;
pub mod middleware;
pub mod state;
pub mod upstream;

use axum::extract::State;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::{Extension, Router};

use crate::error::AppError;
use crate::state::AppState;

/// Assemble the full application router.
///
/// Health probes are mounted outside the gate so orchestrators can reach
/// them without a session and without triggering lookups.
pub fn app(state: AppState) -> Router {
    let gate = state.gate.clone();

    let gated = Router::new()
        .fallback(upstream::pass_through)
        .layer(from_fn(gate::access_gate_middleware))
        .layer(Extension(gate))
        .with_state(state.clone());

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .with_state(state);

    Router::new()
        .merge(health)
        .merge(gated)
        .layer(middleware::tracing_layer::layer())
}

/// Liveness probe. Always 200 while the process runs.
pub async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe. 503 while the session provider reports unhealthy.
pub async fn readiness(State(state): State<AppState>) -> Result<&'static str, AppError> {
    let provider = state.gate.provider();
    provider.health_check().await.map_err(|e| {
        tracing::warn!(provider = provider.name(), error = %e, "readiness check failed");
        AppError::SessionUnavailable(e.to_string())
    })?;
    Ok("ready")
}
