//! # Redirect Targets
//!
//! Builds the `Location` values the gate emits and sanitises the `redirect`
//! parameter when the login flow consumes it.
//!
//! ```text
//! /checkout (anonymous) ──▶ /auth/login?redirect=%2Fcheckout
//!                                        │  sign-in succeeds
//!                                        ▼
//!                          sanitize_return_path(Some("/checkout")) ──▶ /checkout
//! ```

use url::form_urlencoded;

/// Where anonymous callers are sent.
pub const LOGIN_PATH: &str = "/auth/login";

/// Where authenticated callers on auth-only pages are sent.
pub const HOME_PATH: &str = "/";

/// Query parameter carrying the originally requested path.
pub const REDIRECT_PARAM: &str = "redirect";

/// Build the login redirect for an anonymous request to `original_path`.
///
/// The value is form-urlencoded, so `/checkout` becomes `%2Fcheckout`. Only
/// the path is carried; the caller strips the query string.
pub fn login_redirect(login_path: &str, original_path: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair(REDIRECT_PARAM, original_path)
        .finish();
    let separator = if login_path.contains('?') { '&' } else { '?' };
    format!("{login_path}{separator}{query}")
}

/// Turn a decoded `redirect` value into a safe, same-origin destination.
///
/// Falls back to [`HOME_PATH`] when the value is absent, empty, or anything
/// other than an origin-relative path: scheme-qualified URLs,
/// protocol-relative `//host`, backslash variants browsers fold into `//`,
/// and values containing control characters.
pub fn sanitize_return_path(raw: Option<&str>) -> String {
    match raw {
        Some(path) if is_same_origin_path(path) => path.to_string(),
        _ => HOME_PATH.to_string(),
    }
}

/// Extract and sanitise the `redirect` parameter from a raw query string.
pub fn return_path_from_query(query: Option<&str>) -> String {
    let value = query.and_then(|q| {
        form_urlencoded::parse(q.as_bytes())
            .find(|(key, _)| key == REDIRECT_PARAM)
            .map(|(_, value)| value.into_owned())
    });
    sanitize_return_path(value.as_deref())
}

fn is_same_origin_path(path: &str) -> bool {
    let mut chars = path.chars();
    if chars.next() != Some('/') {
        return false;
    }
    if matches!(chars.next(), Some('/') | Some('\\')) {
        return false;
    }
    !path.chars().any(|c| c.is_control() || c == '\\')
}
