//! Credentials carried by an incoming request.

use cookie::Cookie;
use reqwest::header::{HeaderMap, AUTHORIZATION, COOKIE};
use zeroize::Zeroizing;

/// Cookie holding the hosted auth access token (JWT).
pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";

/// Cookie holding the hosted auth refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "sb-refresh-token";

/// The session-relevant slice of a request.
///
/// A bearer token in `Authorization` takes precedence over the access token
/// cookie. Empty values are treated as absent.
#[derive(Clone, Default)]
pub struct RequestContext {
    access_token: Option<Zeroizing<String>>,
    refresh_token: Option<Zeroizing<String>>,
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl RequestContext {
    /// A context with no credentials.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build a context from explicit tokens.
    pub fn with_tokens(access_token: Option<&str>, refresh_token: Option<&str>) -> Self {
        Self {
            access_token: non_empty(access_token),
            refresh_token: non_empty(refresh_token),
        }
    }

    /// Extract credentials from request headers. Every `Cookie` header is read.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut access_cookie = None;
        let mut refresh_cookie = None;

        // Malformed pairs are skipped; the last occurrence of a name wins.
        let cookies = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok);
        for cookie in cookies {
            match cookie.name() {
                ACCESS_TOKEN_COOKIE => access_cookie = Some(cookie),
                REFRESH_TOKEN_COOKIE => refresh_cookie = Some(cookie),
                _ => {}
            }
        }

        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        Self::with_tokens(
            bearer
                .filter(|t| !t.is_empty())
                .or(access_cookie.as_ref().map(Cookie::value_trimmed)),
            refresh_cookie.as_ref().map(Cookie::value_trimmed),
        )
    }

    /// The access token, if any.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_ref().map(|t| t.as_str())
    }

    /// The refresh token, if any.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_ref().map(|t| t.as_str())
    }

    /// Whether the request carries any credential at all.
    pub fn has_credentials(&self) -> bool {
        self.access_token.is_some() || self.refresh_token.is_some()
    }
}

fn non_empty(value: Option<&str>) -> Option<Zeroizing<String>> {
    value
        .filter(|v| !v.is_empty())
        .map(|v| Zeroizing::new(v.to_string()))
}
