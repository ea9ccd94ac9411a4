//! JSON extractor whose rejections use the API error body.
//!
//! `axum::Json` rejects malformed bodies with a plain-text 4xx. Handlers take
//! `ApiJson<T>` instead so a bad body surfaces as a 400 `ValidationError`.

use axum::{
    Json,
    extract::FromRequest,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::AppError;

/// `axum::Json` with [`AppError`] as its rejection.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}
