//! Checkout and order history.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;

use curbside_core::AddressInput;

use super::json::ApiJson;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::Order;
use crate::services::validation::{CartLineInput, validate_cart};
use crate::state::AppState;

/// Checkout body.
///
/// Only `productId` and `quantity` are read from each cart line; any name or
/// price a client includes is discarded during deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub cart: Vec<CartLineInput>,
    pub address: AddressInput,
    pub delivery_notes: Option<String>,
}

/// `POST /api/orders`
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<PlaceOrderRequest>,
) -> Result<(StatusCode, ApiJson<Order>)> {
    let cart = validate_cart(&body.cart)?;

    let order = state
        .order_service()
        .place_order(user.id, &cart, body.address, body.delivery_notes)
        .await?;

    let order_id = order.id.to_string();
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_id", order_id.as_str())]),
    );

    Ok((StatusCode::CREATED, ApiJson(order)))
}

/// `GET /api/orders/myorders`
pub async fn my_orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiJson<Vec<Order>>> {
    Ok(ApiJson(state.order_service().list_mine(user.id).await?))
}
