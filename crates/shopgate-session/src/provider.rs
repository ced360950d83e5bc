//! The session lookup seam.

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::SessionError;
use crate::session::Session;

/// Resolves the session behind a request's credentials.
///
/// Implementations must be cheap to share (`Arc<dyn SessionProvider>`) and
/// hold no per-request state. `Ok(None)` means "anonymous": no credentials,
/// or credentials the provider rejected.
#[async_trait]
pub trait SessionProvider: Send + Sync + std::fmt::Debug {
    /// Look up the session for `ctx`.
    async fn get_session(&self, ctx: &RequestContext) -> Result<Option<Session>, SessionError>;

    /// Check that the provider can currently answer lookups.
    async fn health_check(&self) -> Result<(), SessionError> {
        Ok(())
    }

    /// Short name for logs and readiness output.
    fn name(&self) -> &'static str;
}
