//! Resolved sessions.

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

/// A live session as reported by the provider.
///
/// The gate only checks presence. `subject` and `email` exist for logging
/// and for handlers further down the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Provider user id.
    pub subject: String,
    /// Account email, when the provider returns one.
    pub email: Option<String>,
    /// Access token expiry, when known.
    pub expires_at: Option<DateTime<Utc>>,
    /// Set when the lookup had to refresh an expired access token. The new
    /// pair must be handed back to the browser.
    pub refreshed: Option<TokenPair>,
}

impl Session {
    /// A session for `subject` with no further detail.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            email: None,
            expires_at: None,
            refreshed: None,
        }
    }

    /// Attach an email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Attach a refreshed token pair.
    pub fn with_refreshed(mut self, tokens: TokenPair) -> Self {
        self.expires_at = tokens.expires_at();
        self.refreshed = Some(tokens);
        self
    }

    /// Whether the lookup rotated the caller's tokens.
    pub fn was_refreshed(&self) -> bool {
        self.refreshed.is_some()
    }
}

/// An access/refresh token pair issued by a refresh grant.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// New access token.
    pub access_token: Zeroizing<String>,
    /// New refresh token. Refresh tokens are single-use.
    pub refresh_token: Zeroizing<String>,
    /// Access token lifetime in seconds.
    pub expires_in: Option<u64>,
    /// When the pair was issued.
    pub issued_at: DateTime<Utc>,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

impl TokenPair {
    /// A pair issued now.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in: Option<u64>,
    ) -> Self {
        Self {
            access_token: Zeroizing::new(access_token.into()),
            refresh_token: Zeroizing::new(refresh_token.into()),
            expires_in,
            issued_at: Utc::now(),
        }
    }

    /// Absolute expiry of the access token.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.expires_in?).ok()?;
        self.issued_at
            .checked_add_signed(chrono::Duration::try_seconds(secs)?)
    }
}
