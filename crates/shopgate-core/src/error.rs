//! # Route Configuration Errors

use thiserror::Error;

/// Rejected route table entries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Route entries must be absolute paths.
    #[error("route must start with '/': {0:?}")]
    NotAbsolute(String),

    /// A bare `/` prefix would protect the whole site, including the login page.
    #[error("protected prefix '/' would match every path")]
    RootPrefix,

    /// Matching is byte-exact, so surrounding whitespace can never match.
    #[error("route contains whitespace: {0:?}")]
    Whitespace(String),
}
