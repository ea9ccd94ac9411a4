//! Router assembly.
//!
//! `build_router` is the single place the HTTP surface is put together, so
//! the binary and the integration tests serve exactly the same stack.

use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::from_fn,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::config::StorefrontConfig;
use crate::middleware::{
    api_rate_limiter, auth_rate_limiter, error_detail_middleware, rate_limit_body_middleware,
    request_id_middleware, security_headers_middleware,
};
use crate::routes;
use crate::state::AppState;

/// Build the complete application router.
pub fn build_router(state: AppState) -> Router {
    let config = state.config().clone();

    let mut auth = routes::auth_routes();
    let mut api = routes::api_routes();
    if config.rate_limit {
        if let Some(limiter) = auth_rate_limiter() {
            auth = auth.layer(limiter);
        }
        if let Some(limiter) = api_rate_limiter() {
            api = api.layer(limiter);
        }
    }

    let mut router = Router::new()
        .merge(routes::health_routes())
        .nest("/api/auth", auth)
        .nest("/api", api)
        .fallback(routes::not_found)
        .layer(from_fn(rate_limit_body_middleware));

    if config.environment.exposes_error_detail() {
        router = router.layer(from_fn(error_detail_middleware));
    }

    router
        .layer(cors_layer(&config))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// CORS: any origin unless an allow-list is configured.
fn cors_layer(config: &StorefrontConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(600));

    if config.cors_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
