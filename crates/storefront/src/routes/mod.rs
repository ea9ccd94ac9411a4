//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - "API is running..."
//! GET  /health                        - Liveness
//! GET  /health/ready                  - Readiness (store ping)
//!
//! # Auth (auth rate limit)
//! POST /api/auth/register             - Create account, returns token
//! POST /api/auth/login                - Exchange credentials for token
//!
//! # User (bearer token)
//! GET  /api/user/cart                 - Stored cart with products
//! PUT  /api/user/cart                 - Replace cart
//! PUT  /api/user/addresses            - Replace saved addresses
//!
//! # Orders (bearer token)
//! POST /api/orders                    - Checkout
//! GET  /api/orders/myorders           - Caller's orders, newest first
//!
//! # Admin (bearer token + administrator)
//! GET  /api/admin/orders              - All orders with owners
//! PUT  /api/admin/orders/{id}/status  - Set order status
//! ```

pub mod admin;
pub mod auth;
pub mod health;
pub mod json;
pub mod orders;
pub mod user;

use axum::{
    Router,
    extract::OriginalUri,
    routing::{get, post, put},
};

use crate::error::AppError;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(user::cart).put(user::replace_cart))
        .route("/addresses", put(user::replace_addresses))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::place_order))
        .route("/myorders", get(orders::my_orders))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(admin::list_orders))
        .route("/orders/{id}/status", put(admin::update_status))
}

/// Everything under `/api` except auth.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/user", user_routes())
        .nest("/orders", order_routes())
        .nest("/admin", admin_routes())
}

/// Probe routes, never rate limited.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Fallback for unmatched paths.
///
/// Reports the full request path even when the miss happens inside a nested
/// router.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    let path = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string);
    AppError::NotFound(path)
}
