//! Request ID middleware for request tracing and correlation.
//!
//! Each request carries an ID, either supplied upstream in `x-request-id`
//! or generated here as a UUID v4. The ID is recorded on the `http_request`
//! span and in the Sentry scope, stored as a [`RequestId`] extension for
//! handlers, and echoed back on the response.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream ID accepted as-is.
const MAX_UPSTREAM_LEN: usize = 128;

/// The ID assigned to the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Accept an upstream ID only if it is short and printable.
fn upstream_id(value: &str) -> Option<&str> {
    let value = value.trim();
    let acceptable = !value.is_empty()
        && value.len() <= MAX_UPSTREAM_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    acceptable.then_some(value)
}

/// Middleware that ensures every request has an ID.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(upstream_id)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_id_accepted() {
        assert_eq!(upstream_id("abc-123_x.y"), Some("abc-123_x.y"));
        assert_eq!(upstream_id("  padded  "), Some("padded"));
    }

    #[test]
    fn test_upstream_id_rejected() {
        assert_eq!(upstream_id(""), None);
        assert_eq!(upstream_id("has space"), None);
        assert_eq!(upstream_id("<script>"), None);
        assert_eq!(upstream_id(&"a".repeat(MAX_UPSTREAM_LEN + 1)), None);
    }
}
