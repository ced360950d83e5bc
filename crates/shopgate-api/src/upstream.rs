//! # Pass-Through
//!
//! Everything the gate lets through lands on the router fallback:
//!
//! - excluded asset paths are served from `SHOPGATE_STATIC_DIR` when one is
//!   configured,
//! - everything else is forwarded to the page renderer at
//!   `SHOPGATE_UPSTREAM_URL`,
//! - with neither configured the gateway answers 404.
//!
//! Forwarding buffers request and response bodies. Upstream redirects are
//! relayed to the browser, never followed.

use std::time::Duration;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderName};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use url::Url;

use crate::error::AppError;
use crate::state::AppState;

/// Largest request body forwarded upstream.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Client for the page renderer.
#[derive(Debug, Clone)]
pub struct Upstream {
    http: reqwest::Client,
    base_url: Url,
}

impl Upstream {
    /// Create a client for `base_url`.
    pub fn new(base_url: Url, timeout_secs: u64) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { http, base_url })
    }

    /// Target URL for an incoming path and query, keeping any base path prefix.
    ///
    /// The gate has already canonicalized `path`, so URL resolution here
    /// leaves it as classified.
    pub fn target(&self, path: &str, query: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!("{}{}", self.base_url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        url.set_query(query);
        url
    }

    /// Forward `request` and relay the response.
    pub async fn forward(&self, request: Request) -> Result<Response, AppError> {
        let (parts, body) = request.into_parts();
        let target = self.target(parts.uri.path(), parts.uri.query());

        if let Some(len) = parts
            .headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok())
        {
            if len > MAX_BODY_BYTES {
                return Err(AppError::PayloadTooLarge(format!(
                    "{len} bytes exceeds {MAX_BODY_BYTES}"
                )));
            }
        }

        let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| AppError::PayloadTooLarge(e.to_string()))?;

        let mut headers = forwardable(&parts.headers);
        headers.remove(header::HOST);
        headers.remove(header::CONTENT_LENGTH);
        if let Some(host) = parts.headers.get(header::HOST) {
            headers.insert("x-forwarded-host", host.clone());
        }

        tracing::debug!(method = %parts.method, target = %target, "forwarding");

        let resp = self
            .http
            .request(parts.method, target.clone())
            .headers(headers)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::BadGateway(format!("{target}: {e}")))?;

        let status = resp.status();
        let resp_headers = forwardable(resp.headers());
        let body = resp
            .bytes()
            .await
            .map_err(|e| AppError::BadGateway(format!("{target}: {e}")))?;

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = resp_headers;
        response.headers_mut().remove(header::CONTENT_LENGTH);
        Ok(response)
    }
}

/// Copy `headers` without hop-by-hop entries. Repeated headers are kept.
fn forwardable(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !is_hop_by_hop(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}

/// Router fallback for requests the gate allowed.
pub async fn pass_through(State(state): State<AppState>, request: Request) -> Response {
    let path = request.uri().path().to_string();

    if let Some(static_files) = &state.static_files {
        if state.gate.assets().is_excluded(&path) {
            return match static_files.clone().oneshot(request).await {
                Ok(response) => response.map(Body::new),
                Err(never) => match never {},
            };
        }
    }

    match &state.upstream {
        Some(upstream) => match upstream.forward(request).await {
            Ok(response) => response,
            Err(err) => err.into_response(),
        },
        None => AppError::NotFound(path).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn upstream(base: &str) -> Upstream {
        Upstream::new(Url::parse(base).unwrap(), 5).unwrap()
    }

    #[test]
    fn target_keeps_path_and_query() {
        let up = upstream("http://127.0.0.1:3000");
        assert_eq!(
            up.target("/orders/17", Some("tab=tracking")).as_str(),
            "http://127.0.0.1:3000/orders/17?tab=tracking"
        );
    }

    #[test]
    fn target_keeps_base_prefix() {
        let up = upstream("http://renderer.internal/store/");
        assert_eq!(
            up.target("/checkout", None).as_str(),
            "http://renderer.internal/store/checkout"
        );
    }

    #[test]
    fn target_leaves_canonical_path_untouched() {
        let up = upstream("http://renderer.internal");
        for path in ["/item/%2Fcheckout", "/search/caf%C3%A9", "/orders/"] {
            assert_eq!(up.target(path, None).path(), path);
        }
    }

    #[test]
    fn hop_by_hop_headers_are_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("text/html"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));

        let out = forwardable(&headers);
        assert!(out.get(header::CONNECTION).is_none());
        assert!(out.get("keep-alive").is_none());
        assert!(out.get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(out[header::ACCEPT], "text/html");
        assert_eq!(out.get_all(header::SET_COOKIE).iter().count(), 2);
    }
}
