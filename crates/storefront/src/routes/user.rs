//! Cart and saved addresses for the signed-in user.

use axum::extract::State;
use serde::Deserialize;

use curbside_core::{SavedAddress, SavedAddressInput};

use super::json::ApiJson;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::account::CartLine;
use crate::services::validation::CartLineInput;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CartRequest {
    pub cart: Vec<CartLineInput>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddressesRequest {
    pub addresses: Vec<SavedAddressInput>,
}

/// `GET /api/user/cart`
pub async fn cart(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiJson<Vec<CartLine>>> {
    Ok(ApiJson(state.account().cart(user.id).await?))
}

/// `PUT /api/user/cart`
pub async fn replace_cart(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<CartRequest>,
) -> Result<ApiJson<Vec<CartLine>>> {
    Ok(ApiJson(
        state.account().replace_cart(user.id, &body.cart).await?,
    ))
}

/// `PUT /api/user/addresses`
pub async fn replace_addresses(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<AddressesRequest>,
) -> Result<ApiJson<Vec<SavedAddress>>> {
    Ok(ApiJson(
        state
            .account()
            .replace_addresses(user.id, body.addresses)
            .await?,
    ))
}
