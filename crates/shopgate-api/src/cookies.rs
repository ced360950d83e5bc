//! Set-Cookie emission for refreshed sessions.
//!
//! When a lookup rotates the caller's tokens, the new pair is written back on
//! whatever response the gate produces, redirect or pass-through.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use cookie::time::Duration;
use cookie::{Cookie, SameSite};
use shopgate_session::{TokenPair, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};

/// Lifetime of the refresh cookie.
pub const REFRESH_COOKIE_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

/// A `Path=/; HttpOnly; Secure; SameSite=Lax` cookie, persistent when
/// `max_age` is known.
fn session_cookie(name: &'static str, value: &str, max_age: Option<u64>) -> Cookie<'static> {
    let mut builder = Cookie::build((name, value.to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax);
    if let Some(secs) = max_age.and_then(|secs| i64::try_from(secs).ok()) {
        builder = builder.max_age(Duration::seconds(secs));
    }
    builder.build()
}

fn sensitive_value(rendered: &str) -> Option<HeaderValue> {
    let mut value = HeaderValue::from_str(rendered).ok()?;
    value.set_sensitive(true);
    Some(value)
}

/// Append both session cookies for `tokens`.
///
/// A token that cannot be carried in a header value is skipped with a warning;
/// the caller still gets the response, and the next request refreshes again.
pub fn append_session_cookies(headers: &mut HeaderMap, tokens: &TokenPair) {
    let cookies = [
        session_cookie(
            ACCESS_TOKEN_COOKIE,
            tokens.access_token.as_str(),
            tokens.expires_in,
        ),
        session_cookie(
            REFRESH_TOKEN_COOKIE,
            tokens.refresh_token.as_str(),
            Some(REFRESH_COOKIE_MAX_AGE_SECS),
        ),
    ];

    for cookie in cookies {
        match sensitive_value(&cookie.to_string()) {
            Some(value) => {
                headers.append(SET_COOKIE, value);
            }
            None => tracing::warn!(
                cookie = cookie.name(),
                "refreshed token is not a valid header value, cookie skipped"
            ),
        }
    }
}

/// Rewrite the request `Cookie` header so handlers behind the gate see the
/// refreshed pair instead of the stale one. Other cookies keep their order.
pub fn replace_request_tokens(headers: &mut HeaderMap, tokens: &TokenPair) {
    let mut pairs: Vec<String> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .filter(|c| c.name() != ACCESS_TOKEN_COOKIE && c.name() != REFRESH_TOKEN_COOKIE)
        .map(|c| c.stripped().to_string())
        .collect();
    pairs.push(Cookie::new(ACCESS_TOKEN_COOKIE, tokens.access_token.as_str()).to_string());
    pairs.push(Cookie::new(REFRESH_TOKEN_COOKIE, tokens.refresh_token.as_str()).to_string());

    match sensitive_value(&pairs.join("; ")) {
        Some(value) => {
            headers.insert(COOKIE, value);
        }
        None => tracing::warn!("refreshed token is not a valid header value, request cookies kept"),
    }
}
