//! In-memory session provider.
//!
//! Backs local development (no hosted auth configured) and tests. Tokens map
//! to sessions; a refresh-token map lets callers exercise rotation, and
//! [`MemorySessionProvider::fail_with`] forces lookup errors.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::context::RequestContext;
use crate::error::SessionError;
use crate::provider::SessionProvider;
use crate::session::{Session, TokenPair};

#[derive(Debug, Default)]
struct Inner {
    by_access: HashMap<String, Session>,
    by_refresh: HashMap<String, (Session, TokenPair)>,
    failure: Option<String>,
}

/// Thread-safe, cloneable token → session map.
///
/// The `parking_lot` lock is never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionProvider {
    inner: Arc<RwLock<Inner>>,
}

impl MemorySessionProvider {
    /// An empty provider: every caller is anonymous.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `session` under `access_token`.
    pub fn insert(&self, access_token: impl Into<String>, session: Session) {
        self.inner.write().by_access.insert(access_token.into(), session);
    }

    /// Register a refresh token. Presenting it yields `session` with `tokens`
    /// attached, and the new access token becomes valid. Refresh tokens are
    /// single-use.
    pub fn insert_refresh(
        &self,
        refresh_token: impl Into<String>,
        session: Session,
        tokens: TokenPair,
    ) {
        self.inner
            .write()
            .by_refresh
            .insert(refresh_token.into(), (session, tokens));
    }

    /// Forget `access_token`. Returns the session it pointed to.
    pub fn remove(&self, access_token: &str) -> Option<Session> {
        self.inner.write().by_access.remove(access_token)
    }

    /// Make every lookup and health check fail with `reason`.
    pub fn fail_with(&self, reason: impl Into<String>) {
        self.inner.write().failure = Some(reason.into());
    }

    /// Clear a forced failure.
    pub fn recover(&self) {
        self.inner.write().failure = None;
    }

    /// Number of live access tokens.
    pub fn len(&self) -> usize {
        self.inner.read().by_access.len()
    }

    /// Whether no access tokens are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionProvider for MemorySessionProvider {
    async fn get_session(&self, ctx: &RequestContext) -> Result<Option<Session>, SessionError> {
        if let Some(reason) = self.inner.read().failure.clone() {
            return Err(SessionError::Unavailable(reason));
        }

        if let Some(session) = ctx
            .access_token()
            .and_then(|token| self.inner.read().by_access.get(token).cloned())
        {
            return Ok(Some(session));
        }

        let Some(refresh_token) = ctx.refresh_token() else {
            return Ok(None);
        };

        let mut inner = self.inner.write();
        let Some((session, tokens)) = inner.by_refresh.remove(refresh_token) else {
            return Ok(None);
        };
        inner
            .by_access
            .insert(tokens.access_token.as_str().to_string(), session.clone());
        Ok(Some(session.with_refreshed(tokens)))
    }

    async fn health_check(&self) -> Result<(), SessionError> {
        match self.inner.read().failure.clone() {
            Some(reason) => Err(SessionError::Unavailable(reason)),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
