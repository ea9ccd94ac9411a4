//! Diagnostic `detail` on error bodies.
//!
//! Installed only outside production. Error responses carry their diagnostic
//! text as an [`ErrorDetail`] extension; this middleware folds it into the
//! JSON body as `"detail"`.

use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::header::CONTENT_LENGTH,
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use crate::error::ErrorDetail;

/// Error bodies are small; anything bigger is passed through untouched.
const MAX_ERROR_BODY: usize = 64 * 1024;

/// Add `detail` to JSON error bodies.
pub async fn error_detail_middleware(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let Ok(bytes) = to_bytes(body, MAX_ERROR_BODY).await else {
        tracing::warn!("Error body too large to annotate");
        return Response::from_parts(parts, Body::empty());
    };

    let annotated = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(mut map)) => {
            map.insert("detail".to_string(), Value::String(detail));
            serde_json::to_vec(&map).ok()
        }
        _ => None,
    };

    match annotated {
        Some(bytes) => {
            parts.headers.remove(CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(bytes))
        }
        None => Response::from_parts(parts, Body::from(bytes)),
    }
}
