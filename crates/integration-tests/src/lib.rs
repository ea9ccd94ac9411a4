//! Integration tests for Curbside.
//!
//! Every test drives the real router built by
//! [`curbside_storefront::app::build_router`] over an in-memory store, so no
//! database or network listener is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p curbside-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth` - Registration, login and bearer-token resolution
//! - `checkout` - Pricing and order placement
//! - `status` - Administrator status workflow
//! - `http` - Fallback, headers, error bodies and rate limiting

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use curbside_core::{Email, Price, ProductId};
use curbside_storefront::app::build_router;
use curbside_storefront::config::StorefrontConfig;
use curbside_storefront::db::{MemoryStore, ProductCatalog, UserRepository};
use curbside_storefront::models::Product;
use curbside_storefront::state::AppState;

/// Signing key used by every test app.
pub const TEST_JWT_SECRET: &str = "k3Y!pL9@vX2#mQ7$rT4%wZ8^nB1&cD6*";

/// A router plus direct access to its store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

/// A response with its body decoded.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

/// Default test configuration: in-memory store, no rate limits.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig::for_tests(SecretString::from(TEST_JWT_SECRET))
}

impl TestApp {
    /// App with the default test configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// App with a custom configuration.
    #[must_use]
    pub fn with_config(config: StorefrontConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config, store.clone());
        Self {
            router: build_router(state),
            store,
        }
    }

    /// Send one request through the router.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    /// Send a pre-built request through the router.
    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    /// Register a user and return `(token, user id)`.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> (String, String) {
        let response = self
            .post(
                "/api/auth/register",
                None,
                serde_json::json!({ "name": name, "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

        let token = response.body["token"].as_str().unwrap().to_string();
        let id = response.body["_id"].as_str().unwrap().to_string();
        (token, id)
    }

    /// Register a user and grant them the administrator flag.
    pub async fn register_admin(&self, email: &str) -> String {
        let (token, _) = self.register("Admin", email, "admin-password").await;
        let user = self
            .store
            .find_by_email(&Email::parse(email).unwrap())
            .await
            .unwrap()
            .unwrap();
        self.store.set_admin(user.id, true).await.unwrap();
        token
    }

    /// Add a product to the catalog.
    pub async fn stock(&self, name: &str, cents: i64) -> Product {
        let product = Product {
            id: ProductId::generate(),
            name: name.to_string(),
            price: Price::from_cents(cents).unwrap(),
            image_url: None,
        };
        self.store.upsert(&product).await.unwrap();
        product
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// A complete delivery address body.
#[must_use]
pub fn address() -> Value {
    serde_json::json!({
        "street": "1 Main St",
        "city": "Springfield",
        "state": "IL",
        "zip": "62701"
    })
}
