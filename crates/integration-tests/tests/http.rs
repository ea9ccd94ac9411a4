//! Cross-cutting HTTP behavior: fallback, probes, headers, error bodies and
//! rate limiting.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};

use curbside_integration_tests::{TestApp, test_config};
use curbside_storefront::config::Environment;

// =============================================================================
// Probes and Fallback
// =============================================================================

#[tokio::test]
async fn test_index_and_health() {
    let app = TestApp::new();

    let index = app.get("/", None).await;
    assert_eq!(index.status, StatusCode::OK);
    assert_eq!(index.body, Value::String("API is running...".to_string()));

    let health = app.get("/health", None).await;
    assert_eq!(health.status, StatusCode::OK);

    let ready = app.get("/health/ready", None).await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_path_is_json_404() {
    let app = TestApp::new();

    let response = app.get("/api/nope", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Not Found - /api/nope");
}

// =============================================================================
// Headers
// =============================================================================

#[tokio::test]
async fn test_security_headers_present() {
    let app = TestApp::new();

    let response = app.get("/health", None).await;

    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert!(response.headers.contains_key("content-security-policy"));
}

#[tokio::test]
async fn test_request_id_echoed_or_generated() {
    let app = TestApp::new();

    let generated = app.get("/health", None).await;
    assert!(generated.headers.contains_key("x-request-id"));

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "upstream-123")
        .body(Body::empty())
        .unwrap();
    let echoed = app.send_request(request).await;
    assert_eq!(echoed.headers["x-request-id"], "upstream-123");
}

// =============================================================================
// Error Bodies
// =============================================================================

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let app = TestApp::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.send_request(request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"][0]["path"], "body");
}

#[tokio::test]
async fn test_detail_only_in_development() {
    let dev = TestApp::new();
    let response = dev.get("/api/orders/myorders", None).await;
    assert!(response.body["detail"].is_string());

    let mut config = test_config();
    config.environment = Environment::Production;
    let prod = TestApp::with_config(config);
    let response = prod.get("/api/orders/myorders", None).await;
    assert_eq!(response.body, json!({ "message": "Not authorized" }));
}

// =============================================================================
// Rate Limiting
// =============================================================================

#[tokio::test]
async fn test_auth_routes_rate_limited_per_client() {
    let mut config = test_config();
    config.rate_limit = true;
    let app = TestApp::with_config(config);

    let login = |ip: &'static str| {
        Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", ip)
            .body(Body::from(
                json!({ "email": "ann@example.com", "password": "secret1" }).to_string(),
            ))
            .unwrap()
    };

    for _ in 0..5 {
        let response = app.send_request(login("203.0.113.7")).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let limited = app.send_request(login("203.0.113.7")).await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        limited.body["message"],
        "Too many requests, please try again later"
    );

    let other_client = app.send_request(login("198.51.100.1")).await;
    assert_eq!(other_client.status, StatusCode::UNAUTHORIZED);
}
