//! # Integration Tests for shopgate-api
//!
//! Drives the assembled router: gate decisions per route class, provider
//! failure handling, path canonicalization, refreshed-token propagation,
//! upstream forwarding against a mock renderer, static asset serving, and
//! health probes.

use std::sync::Arc;

use axum::body::Body;
use cookie::Cookie;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use shopgate_api::config::AppConfig;
use shopgate_api::error::ErrorBody;
use shopgate_api::gate::LookupFailurePolicy;
use shopgate_api::state::AppState;
use shopgate_api::upstream::MAX_BODY_BYTES;
use shopgate_session::{MemorySessionProvider, Session, TokenPair};
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{body_string, header as header_is, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper: build the app around `provider` with the given upstream.
fn app_with(
    provider: MemorySessionProvider,
    upstream: Option<&MockServer>,
    policy: LookupFailurePolicy,
) -> axum::Router {
    let config = AppConfig {
        upstream_url: upstream.map(|s| Url::parse(&s.uri()).unwrap()),
        lookup_failure: policy,
        ..AppConfig::default()
    };
    let state = AppState::with_config(config, Arc::new(provider)).unwrap();
    shopgate_api::app(state)
}

fn signed_in() -> MemorySessionProvider {
    let provider = MemorySessionProvider::new();
    provider.insert("tok", Session::new("user-1").with_email("shopper@example.com"));
    provider
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("sb-access-token={token}"))
        .body(Body::empty())
        .unwrap()
}

/// Helper: read response body as string.
async fn body_text(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn error_code(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
    body.error.code
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn liveness_probe_is_ungated() {
    let provider = MemorySessionProvider::new();
    provider.fail_with("down");
    let app = app_with(provider, None, LookupFailurePolicy::Unavailable);

    let response = app.oneshot(get("/health/liveness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn readiness_probe_reports_provider_health() {
    let provider = MemorySessionProvider::new();
    let app = app_with(provider.clone(), None, LookupFailurePolicy::Unavailable);

    let response = app.clone().oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ready");

    provider.fail_with("maintenance");
    let response = app.oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// -- Protected Routes ---------------------------------------------------------

#[tokio::test]
async fn every_protected_route_redirects_anonymous_visitors() {
    let app = app_with(MemorySessionProvider::new(), None, LookupFailurePolicy::Unavailable);

    for route in shopgate_core::route::PROTECTED_ROUTES {
        let response = app.clone().oneshot(get(route)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{route}");
        let expected = shopgate_core::login_redirect("/auth/login", route);
        assert_eq!(response.headers()[header::LOCATION], expected.as_str());
    }
}

#[tokio::test]
async fn nested_protected_path_keeps_full_return_path() {
    let app = app_with(MemorySessionProvider::new(), None, LookupFailurePolicy::Unavailable);
    let response = app.oneshot(get("/orders/17/invoice")).await.unwrap();
    assert_eq!(
        response.headers()[header::LOCATION],
        "/auth/login?redirect=%2Forders%2F17%2Finvoice"
    );
}

#[tokio::test]
async fn signed_in_visitor_reaches_renderer() {
    let renderer = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/checkout"))
        .and(header_is("cookie", "sb-access-token=tok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Checkout</h1>"))
        .expect(1)
        .mount(&renderer)
        .await;

    let app = app_with(signed_in(), Some(&renderer), LookupFailurePolicy::Unavailable);
    let response = app.oneshot(get_with_token("/checkout", "tok")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "<h1>Checkout</h1>");
}

// -- Auth-Only Routes ---------------------------------------------------------

#[tokio::test]
async fn signed_in_visitor_is_sent_home_from_auth_pages() {
    let app = app_with(signed_in(), None, LookupFailurePolicy::Unavailable);

    for route in shopgate_core::route::AUTH_ONLY_ROUTES {
        let response = app.clone().oneshot(get_with_token(route, "tok")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{route}");
        assert_eq!(response.headers()[header::LOCATION], "/");
    }
}

#[tokio::test]
async fn auth_only_match_is_exact() {
    let renderer = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/login/help"))
        .respond_with(ResponseTemplate::new(200).set_body_string("help"))
        .mount(&renderer)
        .await;

    let app = app_with(signed_in(), Some(&renderer), LookupFailurePolicy::Unavailable);
    let response = app
        .oneshot(get_with_token("/auth/login/help", "tok"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn anonymous_visitor_reaches_login_page() {
    let renderer = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("login form"))
        .expect(1)
        .mount(&renderer)
        .await;

    let app = app_with(MemorySessionProvider::new(), Some(&renderer), LookupFailurePolicy::Unavailable);
    let response = app
        .oneshot(get("/auth/login?redirect=%2Fcheckout"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "login form");
}

// -- Public Routes ------------------------------------------------------------

#[tokio::test]
async fn public_page_passes_for_everyone() {
    let renderer = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/item/42"))
        .respond_with(ResponseTemplate::new(200).set_body_string("item"))
        .expect(2)
        .mount(&renderer)
        .await;

    let app = app_with(signed_in(), Some(&renderer), LookupFailurePolicy::Unavailable);
    let anon = app.clone().oneshot(get("/item/42")).await.unwrap();
    assert_eq!(anon.status(), StatusCode::OK);
    let member = app.oneshot(get_with_token("/item/42", "tok")).await.unwrap();
    assert_eq!(member.status(), StatusCode::OK);
}

#[tokio::test]
async fn public_page_without_upstream_is_not_found() {
    let app = app_with(MemorySessionProvider::new(), None, LookupFailurePolicy::Unavailable);
    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(response).await, "NOT_FOUND");
}

// -- Path Canonicalization ----------------------------------------------------

#[tokio::test]
async fn disguised_protected_paths_are_gated() {
    let renderer = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("checkout"))
        .expect(0)
        .mount(&renderer)
        .await;

    let app = app_with(MemorySessionProvider::new(), Some(&renderer), LookupFailurePolicy::Unavailable);
    for uri in ["/./checkout", "/item/../checkout", "/%63heckout", "/item/%2e%2E/checkout"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{uri}");
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/login?redirect=%2Fcheckout",
            "{uri}"
        );
    }
}

#[tokio::test]
async fn disguised_auth_page_sends_signed_in_visitor_home() {
    let app = app_with(signed_in(), None, LookupFailurePolicy::Unavailable);
    let response = app
        .oneshot(get_with_token("/item/../auth/%6Cogin", "tok"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn renderer_receives_the_classified_path() {
    let renderer = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/checkout"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Checkout</h1>"))
        .expect(1)
        .mount(&renderer)
        .await;

    let app = app_with(signed_in(), Some(&renderer), LookupFailurePolicy::Unavailable);
    let response = app
        .oneshot(get_with_token("/item/../checkout", "tok"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "<h1>Checkout</h1>");
}

// -- Provider Failure ---------------------------------------------------------

#[tokio::test]
async fn provider_outage_on_protected_path_is_503() {
    let provider = signed_in();
    provider.fail_with("connect timeout");
    let app = app_with(provider, None, LookupFailurePolicy::Unavailable);

    let response = app.oneshot(get_with_token("/profile", "tok")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.headers()[header::RETRY_AFTER], "5");
    assert_eq!(error_code(response).await, "SESSION_PROVIDER_UNAVAILABLE");
}

#[tokio::test]
async fn provider_outage_does_not_block_public_pages() {
    let renderer = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("home"))
        .mount(&renderer)
        .await;

    let provider = MemorySessionProvider::new();
    provider.fail_with("connect timeout");
    let app = app_with(provider, Some(&renderer), LookupFailurePolicy::Unavailable);

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn anonymous_policy_redirects_on_outage() {
    let provider = signed_in();
    provider.fail_with("connect timeout");
    let app = app_with(provider, None, LookupFailurePolicy::TreatAsAnonymous);

    let response = app.oneshot(get_with_token("/upload", "tok")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/auth/login?redirect=%2Fupload"
    );
}

// -- Token Refresh ------------------------------------------------------------

#[tokio::test]
async fn refreshed_tokens_reach_renderer_and_browser() {
    let renderer = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(header_is(
            "cookie",
            "theme=dark; sb-access-token=acc-new; sb-refresh-token=ref-new",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string("orders"))
        .expect(1)
        .mount(&renderer)
        .await;

    let provider = MemorySessionProvider::new();
    provider.insert_refresh(
        "ref-old",
        Session::new("user-3"),
        TokenPair::new("acc-new", "ref-new", Some(3600)),
    );
    let app = app_with(provider, Some(&renderer), LookupFailurePolicy::Unavailable);

    let request = Request::builder()
        .uri("/orders")
        .header(
            header::COOKIE,
            "theme=dark; sb-access-token=acc-old; sb-refresh-token=ref-old",
        )
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookies: Vec<_> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(cookies.len(), 2);

    let access = Cookie::parse(cookies[0].as_str()).unwrap();
    assert_eq!((access.name(), access.value()), ("sb-access-token", "acc-new"));
    assert_eq!(access.max_age().map(|d| d.whole_seconds()), Some(3600));
    assert_eq!(access.http_only(), Some(true));

    let refresh = Cookie::parse(cookies[1].as_str()).unwrap();
    assert_eq!((refresh.name(), refresh.value()), ("sb-refresh-token", "ref-new"));
}

// -- Upstream Forwarding ------------------------------------------------------

#[tokio::test]
async fn request_body_and_method_are_forwarded() {
    let renderer = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/checkout"))
        .and(body_string("{\"cart\":1}"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&renderer)
        .await;

    let app = app_with(signed_in(), Some(&renderer), LookupFailurePolicy::Unavailable);
    let request = Request::builder()
        .method("POST")
        .uri("/checkout")
        .header(header::COOKIE, "sb-access-token=tok")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"cart\":1}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn upstream_redirects_are_relayed_not_followed() {
    let renderer = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sale"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/item/9"))
        .expect(1)
        .mount(&renderer)
        .await;

    let app = app_with(MemorySessionProvider::new(), Some(&renderer), LookupFailurePolicy::Unavailable);
    let response = app.oneshot(get("/sale")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/item/9");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let renderer = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&renderer)
        .await;

    let app = app_with(MemorySessionProvider::new(), Some(&renderer), LookupFailurePolicy::Unavailable);
    let request = Request::builder()
        .method("POST")
        .uri("/search")
        .body(Body::from(vec![b'x'; MAX_BODY_BYTES + 1]))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body.error.details,
        Some(serde_json::json!({ "limit_bytes": MAX_BODY_BYTES }))
    );
}

#[tokio::test]
async fn unreachable_renderer_is_bad_gateway() {
    let config = AppConfig {
        upstream_url: Some(Url::parse("http://127.0.0.1:1").unwrap()),
        upstream_timeout_secs: 2,
        ..AppConfig::default()
    };
    let state = AppState::with_config(config, Arc::new(MemorySessionProvider::new())).unwrap();
    let app = shopgate_api::app(state);

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(response).await, "BAD_GATEWAY");
}

// -- Static Assets ------------------------------------------------------------

#[tokio::test]
async fn asset_paths_are_served_from_static_dir_without_lookup() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("logo.png"), b"png-bytes").unwrap();
    std::fs::create_dir_all(dir.path().join("_next/static")).unwrap();
    std::fs::write(dir.path().join("_next/static/app.js"), b"js-bytes").unwrap();

    let provider = MemorySessionProvider::new();
    provider.fail_with("down");
    let config = AppConfig {
        static_dir: Some(dir.path().to_path_buf()),
        ..AppConfig::default()
    };
    let app = shopgate_api::app(AppState::with_config(config, Arc::new(provider)).unwrap());

    let response = app.clone().oneshot(get("/logo.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "png-bytes");

    let response = app.clone().oneshot(get("/_next/static/app.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "js-bytes");

    let response = app.oneshot(get("/missing.webp")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn asset_under_protected_prefix_is_not_gated() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("profile")).unwrap();
    std::fs::write(dir.path().join("profile/banner.jpg"), b"jpg").unwrap();

    let config = AppConfig {
        static_dir: Some(dir.path().to_path_buf()),
        ..AppConfig::default()
    };
    let app = shopgate_api::app(
        AppState::with_config(config, Arc::new(MemorySessionProvider::new())).unwrap(),
    );

    let response = app.oneshot(get("/profile/banner.jpg")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
