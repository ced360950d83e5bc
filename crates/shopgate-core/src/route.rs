//! # Route Classification
//!
//! Two static, ordered route sets decide which paths the gate cares about:
//!
//! - **protected**: prefix match, requires an authenticated session.
//! - **auth-only**: exact match, reserved for anonymous callers
//!   (login, signup and password recovery flows).
//!
//! Matching is case-sensitive and byte-exact. Prefix matching is a plain
//! `starts_with`, so `/chat` also covers `/chat/42` and `/chatroom`.

use serde::Serialize;

use crate::error::RouteError;

/// Path prefixes that require a session.
pub const PROTECTED_ROUTES: &[&str] = &[
    "/profile",
    "/upload",
    "/checkout",
    "/orders",
    "/favorites",
    "/chat",
];

/// Exact paths that only anonymous callers may visit.
pub const AUTH_ONLY_ROUTES: &[&str] = &[
    "/auth/login",
    "/auth/signup",
    "/auth/forgot-password",
    "/auth/reset-password",
];

/// How a request path relates to the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteClass {
    /// Matches a protected prefix.
    Protected,
    /// Exactly equals an auth-only path.
    AuthOnly,
    /// Neither; the session state does not affect the outcome.
    Public,
}

impl RouteClass {
    /// Return the string representation of this class.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Protected => "protected",
            Self::AuthOnly => "auth_only",
            Self::Public => "public",
        }
    }

    /// Whether the gate outcome for this class depends on the session.
    pub fn is_session_sensitive(&self) -> bool {
        !matches!(self, Self::Public)
    }
}

impl std::fmt::Display for RouteClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The protected and auth-only route sets, in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    protected: Vec<String>,
    auth_only: Vec<String>,
}

impl RouteTable {
    /// Build a route table from explicit lists.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] if an entry is not an absolute path, contains
    /// whitespace, or is a protected `/` prefix.
    pub fn new<P, A>(protected: P, auth_only: A) -> Result<Self, RouteError>
    where
        P: IntoIterator,
        P::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        let protected = protected
            .into_iter()
            .map(Into::into)
            .map(|route| {
                validate(&route)?;
                if route == "/" {
                    return Err(RouteError::RootPrefix);
                }
                Ok(route)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let auth_only = auth_only
            .into_iter()
            .map(Into::into)
            .map(|route| validate(&route).map(|()| route))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            protected,
            auth_only,
        })
    }

    /// The fixed storefront table.
    pub fn storefront() -> Self {
        Self {
            protected: PROTECTED_ROUTES.iter().map(|r| r.to_string()).collect(),
            auth_only: AUTH_ONLY_ROUTES.iter().map(|r| r.to_string()).collect(),
        }
    }

    /// Protected prefixes, in evaluation order.
    pub fn protected(&self) -> &[String] {
        &self.protected
    }

    /// Auth-only paths, in evaluation order.
    pub fn auth_only(&self) -> &[String] {
        &self.auth_only
    }

    /// Whether `path` starts with any protected prefix.
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected.iter().any(|route| path.starts_with(route.as_str()))
    }

    /// Whether `path` is exactly an auth-only route.
    pub fn is_auth_only(&self, path: &str) -> bool {
        self.auth_only.iter().any(|route| path == route)
    }

    /// Classify `path`. Protected takes precedence over auth-only.
    pub fn classify(&self, path: &str) -> RouteClass {
        if self.is_protected(path) {
            RouteClass::Protected
        } else if self.is_auth_only(path) {
            RouteClass::AuthOnly
        } else {
            RouteClass::Public
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::storefront()
    }
}

fn validate(route: &str) -> Result<(), RouteError> {
    if !route.starts_with('/') {
        return Err(RouteError::NotAbsolute(route.to_string()));
    }
    if route.chars().any(char::is_whitespace) {
        return Err(RouteError::Whitespace(route.to_string()));
    }
    Ok(())
}
