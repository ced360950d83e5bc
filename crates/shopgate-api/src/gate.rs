//! # Access Gate Middleware
//!
//! Runs on every request that reaches the storefront router:
//!
//! ```text
//! canonical_path ─differs─▶ request URI rewritten
//!      │
//!      ▼
//! AssetFilter ─excluded─▶ next (no lookup)
//!      │
//!      ▼
//! classify ─▶ SessionProvider::get_session ─▶ Decision
//!                      │ error                   ├─ Allow            ─▶ next (+ Set-Cookie)
//!                      ▼                         ├─ RedirectToLogin  ─▶ 307 /auth/login?redirect=…
//!             LookupFailurePolicy                └─ RedirectToHome   ─▶ 307 /
//! ```
//!
//! Handlers behind the gate see the canonical path, the one that was
//! classified. The gate holds no per-request state. The provider is injected as an
//! `Arc<dyn SessionProvider>`, and the resolved [`Session`] is placed in the
//! request extensions for handlers further down the stack.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::uri::{PathAndQuery, Uri};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use shopgate_core::{canonical_path, AssetFilter, Decision, RouteClass, RouteTable, SessionState};
use shopgate_session::{RequestContext, Session, SessionError, SessionProvider};

use crate::cookies::{append_session_cookies, replace_request_tokens};
use crate::error::AppError;

// ── Failure Policy ──────────────────────────────────────────────────────────

/// What to do when the session provider cannot answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupFailurePolicy {
    /// Answer 503 on protected and auth-only paths; public paths pass through.
    #[default]
    Unavailable,
    /// Treat the caller as anonymous.
    TreatAsAnonymous,
}

impl LookupFailurePolicy {
    /// Return the string representation of this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::TreatAsAnonymous => "anonymous",
        }
    }
}

impl FromStr for LookupFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unavailable" | "fail-closed" => Ok(Self::Unavailable),
            "anonymous" | "fail-open" => Ok(Self::TreatAsAnonymous),
            other => Err(format!(
                "unknown lookup failure policy {other:?}, expected \"unavailable\" or \"anonymous\""
            )),
        }
    }
}

// ── Outcome ─────────────────────────────────────────────────────────────────

/// Result of evaluating one request against the gate.
#[derive(Debug)]
pub enum GateOutcome {
    /// Asset path; the gate did not run.
    Excluded,
    /// The gate reached a decision.
    Decided {
        /// Route class of the canonical path.
        class: RouteClass,
        /// What the gate does with the request.
        decision: Decision,
        /// The caller's session, if the lookup found one.
        session: Option<Session>,
    },
    /// The provider failed and the policy refuses to guess.
    Unavailable {
        /// Route class of the canonical path.
        class: RouteClass,
        /// The lookup failure.
        error: SessionError,
    },
}

// ── AccessGate ──────────────────────────────────────────────────────────────

/// Route tables plus the injected session lookup capability.
///
/// Cheap to clone; injected into request extensions.
#[derive(Clone)]
pub struct AccessGate {
    routes: Arc<RouteTable>,
    assets: Arc<AssetFilter>,
    provider: Arc<dyn SessionProvider>,
    policy: LookupFailurePolicy,
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("routes", &self.routes)
            .field("assets", &self.assets)
            .field("provider", &self.provider.name())
            .field("policy", &self.policy)
            .finish()
    }
}

impl AccessGate {
    /// A gate over the storefront tables with the default failure policy.
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        Self {
            routes: Arc::new(RouteTable::storefront()),
            assets: Arc::new(AssetFilter::storefront()),
            provider,
            policy: LookupFailurePolicy::default(),
        }
    }

    /// Replace the failure policy.
    pub fn with_policy(mut self, policy: LookupFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Asset exclusions; the pass-through serves these from the static dir.
    pub fn assets(&self) -> &AssetFilter {
        &self.assets
    }

    /// The injected session lookup, also polled by `/health/readiness`.
    pub fn provider(&self) -> &Arc<dyn SessionProvider> {
        &self.provider
    }

    /// Evaluate a request path and its headers. Suspends once, at the lookup.
    ///
    /// `path` is canonicalized first, so `/item/../checkout` is judged as
    /// `/checkout`.
    pub async fn evaluate(&self, path: &str, headers: &HeaderMap) -> GateOutcome {
        let path = canonical_path(path);
        let path = path.as_ref();
        if self.assets.is_excluded(path) {
            return GateOutcome::Excluded;
        }

        let class = self.routes.classify(path);
        let ctx = RequestContext::from_headers(headers);

        let session = match self.provider.get_session(&ctx).await {
            Ok(session) => session,
            Err(error) => {
                tracing::warn!(
                    path,
                    class = %class,
                    provider = self.provider.name(),
                    kind = error.kind(),
                    error = %error,
                    "session lookup failed"
                );
                match (self.policy, class.is_session_sensitive()) {
                    (LookupFailurePolicy::Unavailable, true) => {
                        return GateOutcome::Unavailable { class, error };
                    }
                    _ => None,
                }
            }
        };

        let state = SessionState::from_presence(session.as_ref());
        let decision = Decision::for_class(class, path, state);
        tracing::debug!(
            path,
            class = %class,
            session = state.as_str(),
            outcome = decision.as_str(),
            "gate decision"
        );

        GateOutcome::Decided {
            class,
            decision,
            session,
        }
    }
}

// ── Middleware ──────────────────────────────────────────────────────────────

/// Access gate middleware. Expects an [`AccessGate`] in the request extensions.
///
/// A missing gate is a wiring bug; the request is refused with 500 rather
/// than served ungated.
pub async fn access_gate_middleware(mut request: Request, next: Next) -> Response {
    let Some(gate) = request.extensions().get::<AccessGate>().cloned() else {
        return AppError::Internal("access gate extension missing".into()).into_response();
    };

    let path = canonical_path(request.uri().path()).into_owned();
    if path != request.uri().path() {
        tracing::debug!(raw = request.uri().path(), path = %path, "path canonicalized");
        if let Err(err) = rewrite_path(&mut request, &path) {
            return err.into_response();
        }
    }
    let headers = request.headers().clone();

    let (decision, session) = match gate.evaluate(&path, &headers).await {
        GateOutcome::Excluded => return next.run(request).await,
        GateOutcome::Unavailable { error, .. } => {
            return AppError::SessionUnavailable(error.to_string()).into_response();
        }
        GateOutcome::Decided {
            decision, session, ..
        } => (decision, session),
    };

    let refreshed = session.as_ref().and_then(|s| s.refreshed.clone());

    let mut response = match decision.location() {
        Some(location) => {
            tracing::info!(path = %path, outcome = decision.as_str(), location = %location, "redirecting");
            Redirect::temporary(&location).into_response()
        }
        None => {
            if let Some(tokens) = &refreshed {
                replace_request_tokens(request.headers_mut(), tokens);
            }
            if let Some(session) = session {
                tracing::debug!(subject = %session.subject, "session attached");
                request.extensions_mut().insert(session);
            }
            next.run(request).await
        }
    };

    if let Some(tokens) = refreshed {
        append_session_cookies(response.headers_mut(), &tokens);
    }

    response
}

/// Point `request` at `path`, keeping its query.
fn rewrite_path(request: &mut Request, path: &str) -> Result<(), AppError> {
    let path_and_query = match request.uri().query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };
    let mut parts = request.uri().clone().into_parts();
    parts.path_and_query = Some(
        PathAndQuery::try_from(path_and_query).map_err(|e| AppError::Internal(e.to_string()))?,
    );
    *request.uri_mut() = Uri::from_parts(parts).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(())
}
