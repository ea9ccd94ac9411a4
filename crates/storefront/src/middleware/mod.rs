//! HTTP middleware stack for the storefront API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (`http_request` span)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//! 5. CORS
//! 6. Error detail (development only)
//! 7. Rate limiting (governor), per route group
//!
//! Authentication is not a layer: handlers opt in with the [`RequireAuth`]
//! and [`RequireAdmin`] extractors.

pub mod auth;
pub mod error_detail;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::{RequireAdmin, RequireAuth};
pub use error_detail::error_detail_middleware;
pub use rate_limit::{api_rate_limiter, auth_rate_limiter, rate_limit_body_middleware};
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
