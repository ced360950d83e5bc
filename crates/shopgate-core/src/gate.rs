//! # Gate Decision
//!
//! The three-way outcome for a classified request path and session state.
//! `decide` is a pure function; the async session lookup happens before it
//! is called.

use serde::Serialize;

use crate::redirect::{login_redirect, HOME_PATH, LOGIN_PATH};
use crate::route::{RouteClass, RouteTable};

/// Whether the caller presented a live session. Only presence matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// A session was resolved.
    Authenticated,
    /// No session, or (under the fail-open policy) the lookup failed.
    Anonymous,
}

impl SessionState {
    /// Derive the state from an optional session of any type.
    pub fn from_presence<T>(session: Option<&T>) -> Self {
        if session.is_some() {
            Self::Authenticated
        } else {
            Self::Anonymous
        }
    }

    /// Return the string representation of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authenticated => "authenticated",
            Self::Anonymous => "anonymous",
        }
    }
}

/// What the gate does with a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Decision {
    /// Forward the request unchanged.
    Allow,
    /// Send an anonymous caller to the login page, remembering the target.
    RedirectToLogin {
        /// The originally requested path.
        return_to: String,
    },
    /// Send an authenticated caller away from an auth-only page.
    RedirectToHome,
}

impl Decision {
    /// Decide for a path that has already been classified.
    pub fn for_class(class: RouteClass, path: &str, state: SessionState) -> Self {
        match (class, state) {
            (RouteClass::Protected, SessionState::Anonymous) => Self::RedirectToLogin {
                return_to: path.to_string(),
            },
            (RouteClass::AuthOnly, SessionState::Authenticated) => Self::RedirectToHome,
            _ => Self::Allow,
        }
    }

    /// The `Location` header value, or `None` for [`Decision::Allow`].
    pub fn location(&self) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin { return_to } => Some(login_redirect(LOGIN_PATH, return_to)),
            Self::RedirectToHome => Some(HOME_PATH.to_string()),
        }
    }

    /// Whether this decision ends the request with a redirect.
    pub fn is_redirect(&self) -> bool {
        !matches!(self, Self::Allow)
    }

    /// Return the string representation of this decision's outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::RedirectToLogin { .. } => "redirect_to_login",
            Self::RedirectToHome => "redirect_to_home",
        }
    }
}

/// Classify `path` against `table` and decide for `state`.
pub fn decide(table: &RouteTable, path: &str, state: SessionState) -> Decision {
    Decision::for_class(table.classify(path), path, state)
}
