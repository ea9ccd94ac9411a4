//! Rate limiting using governor and `tower_governor`.
//!
//! Two limiters, both keyed on the client IP:
//! - `auth_rate_limiter`: register and login (~10/min, burst 5)
//! - `api_rate_limiter`: everything else under `/api` (~100/min, burst 50)

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::error::{AppError, ErrorDetail};

/// Proxy headers carrying the real client IP, most trusted first.
const CLIENT_IP_HEADERS: [&str; 4] = [
    "cf-connecting-ip",
    "x-forwarded-for",
    "x-real-ip",
    "fly-client-ip",
];

/// Key extractor that reads the client IP from proxy headers and falls back
/// to the socket peer address.
#[derive(Debug, Clone, Copy)]
pub struct ClientIpKeyExtractor;

/// First parseable client IP among the proxy headers.
///
/// For `X-Forwarded-For` only the left-most entry is considered.
fn ip_from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    CLIENT_IP_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    })
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &axum::http::Request<T>) -> Result<Self::Key, GovernorError> {
        ip_from_headers(req.headers())
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn limiter(replenish_secs: u64, burst: u32) -> Option<RateLimiterLayer> {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(replenish_secs)
        .burst_size(burst)
        .finish()?;
    Some(GovernorLayer::new(Arc::new(config)))
}

/// Rate limiter for register and login: one token every 6 seconds, burst of 5.
///
/// Returns `None` only if governor rejects the quota.
#[must_use]
pub fn auth_rate_limiter() -> Option<RateLimiterLayer> {
    limiter(6, 5)
}

/// Rate limiter for the rest of the API: one token per second, burst of 50.
#[must_use]
pub fn api_rate_limiter() -> Option<RateLimiterLayer> {
    limiter(1, 50)
}

/// Replace governor's plain-text 429 with the standard JSON error body.
pub async fn rate_limit_body_middleware(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    if response.status() == StatusCode::TOO_MANY_REQUESTS
        && response.extensions().get::<ErrorDetail>().is_none()
    {
        let retry_after = response.headers().get("retry-after").cloned();
        let mut replaced = AppError::RateLimited.into_response();
        if let Some(value) = retry_after {
            replaced.headers_mut().insert("retry-after", value);
        }
        return replaced;
    }

    response
}
