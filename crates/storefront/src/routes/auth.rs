//! Registration and login.
//!
//! Both return the user together with a freshly signed bearer token:
//!
//! ```json
//! { "_id": "...", "name": "...", "email": "...", "isAdmin": false,
//!   "addresses": [], "cart": [], "token": "..." }
//! ```

use axum::{extract::State, http::StatusCode};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use curbside_core::{CartEntry, Email, SavedAddress, UserId};

use super::json::ApiJson;
use crate::error::Result;
use crate::services::auth::SignedIn;
use crate::state::AppState;

/// Registration body. Missing fields are reported by validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A user and their token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub is_admin: bool,
    pub addresses: Vec<SavedAddress>,
    pub cart: Vec<CartEntry>,
    pub token: String,
}

impl From<SignedIn> for AuthResponse {
    fn from(SignedIn { user, token }: SignedIn) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            is_admin: user.is_admin,
            addresses: user.addresses,
            cart: user.cart,
            token,
        }
    }
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, ApiJson<AuthResponse>)> {
    let signed_in = state
        .auth()
        .register(&body.name, &body.email, SecretString::from(body.password))
        .await?;

    Ok((StatusCode::CREATED, ApiJson(signed_in.into())))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<ApiJson<AuthResponse>> {
    let signed_in = state
        .auth()
        .login(&body.email, &SecretString::from(body.password))
        .await?;

    Ok(ApiJson(signed_in.into()))
}
