//! # shopgate-session -- Session Lookup for the Access Gate
//!
//! The gate never owns session state. It is handed an
//! `Arc<dyn SessionProvider>` and asks it, once per request, whether the
//! credentials on that request resolve to a live session.
//!
//! ## Providers
//!
//! - [`HostedAuthProvider`] -- the hosted identity service (GoTrue-compatible
//!   REST). Validates the access token and, when it has expired, exchanges the
//!   refresh token for a new pair.
//! - [`MemorySessionProvider`] -- token map for local development and tests.
//!
//! ## Credentials
//!
//! [`RequestContext`] carries the access and refresh tokens pulled from the
//! `Cookie` and `Authorization` headers. Tokens are held in
//! `zeroize::Zeroizing` and redacted from `Debug` output.

pub mod config;
pub mod context;
pub mod error;
pub mod hosted;
pub mod memory;
pub mod provider;
pub mod session;

pub use config::{ConfigError, HostedAuthConfig};
pub use context::{RequestContext, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
pub use error::SessionError;
pub use hosted::HostedAuthProvider;
pub use memory::MemorySessionProvider;
pub use provider::SessionProvider;
pub use session::{Session, TokenPair};
