//! Bearer-token extractors.
//!
//! `RequireAuth` resolves `Authorization: Bearer <token>` to a stored user.
//! `RequireAdmin` does the same and then checks the administrator flag, so an
//! unauthenticated caller is always rejected with 401 before the 403 check
//! can run.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::services::auth::require_admin;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn my_orders(
///     State(state): State<AppState>,
///     RequireAuth(user): RequireAuth,
/// ) -> Result<Json<Vec<Order>>> {
///     Ok(Json(state.order_service().list_mine(user.id).await?))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub User);

/// Extractor that requires a valid bearer token for an administrator.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub User);

/// Pull the token out of an `Authorization: Bearer ...` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthenticated)?;
        let user = state.auth().authenticate(token).await?;

        tracing::Span::current().record("user_id", tracing::field::display(user.id));
        set_sentry_user(&user.id);

        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        require_admin(&user)?;
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(value) {
            headers.insert(AUTHORIZATION, v);
        }
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("abc.def.ghi")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
