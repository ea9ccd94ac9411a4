//! Staff order management.
//!
//! Every handler here takes [`RequireAdmin`], which authenticates before it
//! checks the administrator flag.

use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use curbside_core::{DeliveryAddress, OrderId, OrderStatus, Price};

use super::json::ApiJson;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Order, OrderLineItem, OrderOwner, OwnedOrder};
use crate::services::validation::ValidationErrors;
use crate::state::AppState;

/// An order as staff see it: the owner is populated instead of an ID.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrder {
    #[serde(rename = "_id")]
    pub id: OrderId,
    /// `null` if the owning account has been removed.
    pub user: Option<OrderOwner>,
    pub items: Vec<OrderLineItem>,
    pub total: Price,
    pub status: OrderStatus,
    pub address: DeliveryAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OwnedOrder> for AdminOrder {
    fn from(OwnedOrder { order, owner }: OwnedOrder) -> Self {
        Self {
            id: order.id,
            user: owner,
            items: order.items,
            total: order.total,
            status: order.status,
            address: order.address,
            delivery_notes: order.delivery_notes,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Status update body.
///
/// `status` is taken as any JSON value so that numbers, arrays and other
/// non-strings are reported as an invalid status rather than a malformed body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusRequest {
    pub status: Option<Value>,
}

/// Accept only one of the exact status literals.
fn parse_status(value: Option<Value>) -> Result<OrderStatus> {
    match value {
        Some(Value::String(raw)) => raw.parse().map_err(|_| AppError::InvalidStatus(raw)),
        Some(other) => Err(AppError::InvalidStatus(other.to_string())),
        None => Err(AppError::InvalidStatus(String::new())),
    }
}

/// `GET /api/admin/orders`
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<ApiJson<Vec<AdminOrder>>> {
    let orders = state.order_service().list_all(&admin).await?;
    Ok(ApiJson(orders.into_iter().map(AdminOrder::from).collect()))
}

/// `PUT /api/admin/orders/{id}/status`
///
/// The status literal is checked before the order is looked up.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StatusRequest>,
) -> Result<ApiJson<Order>> {
    let status = parse_status(body.status)?;

    let id: OrderId = id
        .parse()
        .map_err(|_| ValidationErrors::single("id", "Invalid order id"))?;

    let order = state
        .order_service()
        .set_status(&admin, id, status)
        .await?;

    Ok(ApiJson(order))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_status_accepts_exact_literals() {
        for status in OrderStatus::ALL {
            let parsed = parse_status(Some(json!(status.as_str())));
            assert!(matches!(parsed, Ok(s) if s == status));
        }
    }

    #[test]
    fn test_parse_status_rejects_everything_else() {
        let bad = [
            Some(json!("delivered")),
            Some(json!("Nope")),
            Some(json!(3)),
            Some(json!(["Delivered"])),
            Some(json!({ "status": "Delivered" })),
            Some(json!(true)),
            None,
        ];
        for value in bad {
            assert!(matches!(
                parse_status(value),
                Err(AppError::InvalidStatus(_))
            ));
        }
    }
}
