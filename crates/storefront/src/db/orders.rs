//! `PostgreSQL` order repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use curbside_core::{
    DeliveryAddress, Email, OrderId, OrderStatus, Price, ProductId, Quantity, UserId,
};

use super::{OrderRepository, PgStore, RepositoryError};
use crate::models::{NewOrder, Order, OrderLineItem, OrderOwner, OwnedOrder};

const ORDER_COLUMNS: &str =
    "id, user_id, items, total, status, address, delivery_notes, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Line item as stored in the `items` JSONB column.
///
/// The price is written as a decimal string so the stored snapshot keeps every
/// digit of the catalog price and still sums to the `NUMERIC` total.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLineItem {
    product_id: ProductId,
    name: String,
    quantity: Quantity,
    #[serde(with = "rust_decimal::serde::str")]
    price: Decimal,
}

impl From<&OrderLineItem> for StoredLineItem {
    fn from(item: &OrderLineItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name.clone(),
            quantity: item.quantity,
            price: item.price.amount(),
        }
    }
}

impl TryFrom<StoredLineItem> for OrderLineItem {
    type Error = RepositoryError;

    fn try_from(stored: StoredLineItem) -> Result<Self, Self::Error> {
        let price = Price::new(stored.price).map_err(|e| {
            RepositoryError::DataCorruption(format!(
                "invalid price for product {}: {e}",
                stored.product_id
            ))
        })?;

        Ok(Self {
            product_id: stored.product_id,
            name: stored.name,
            quantity: stored.quantity,
            price,
        })
    }
}

fn stored_items(items: &[OrderLineItem]) -> Json<Vec<StoredLineItem>> {
    Json(items.iter().map(StoredLineItem::from).collect())
}

/// Internal row type for `PostgreSQL` order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    items: Json<Vec<StoredLineItem>>,
    total: Decimal,
    status: OrderStatus,
    address: Json<DeliveryAddress>,
    delivery_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let total = Price::new(row.total).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid total for order {}: {e}", row.id))
        })?;
        let items = row
            .items
            .0
            .into_iter()
            .map(OrderLineItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: OrderId::new(row.id),
            user: UserId::new(row.user_id),
            items,
            total,
            status: row.status,
            address: row.address.0,
            delivery_notes: row.delivery_notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// An order row joined with its owner's summary columns.
#[derive(Debug, sqlx::FromRow)]
struct OwnedOrderRow {
    #[sqlx(flatten)]
    order: OrderRow,
    owner_name: Option<String>,
    owner_email: Option<String>,
}

impl TryFrom<OwnedOrderRow> for OwnedOrder {
    type Error = RepositoryError;

    fn try_from(row: OwnedOrderRow) -> Result<Self, Self::Error> {
        let order = Order::try_from(row.order)?;

        let owner = match (row.owner_name, row.owner_email) {
            (Some(name), Some(email)) => {
                let email = Email::parse(&email).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
                })?;
                Some(OrderOwner {
                    id: order.user,
                    name,
                    email,
                })
            }
            _ => None,
        };

        Ok(Self { order, owner })
    }
}

// =============================================================================
// Repository
// =============================================================================

#[async_trait]
impl OrderRepository for PgStore {
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO orders (id, user_id, items, total, status, address, delivery_notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(order.user().as_uuid())
        .bind(stored_items(order.items()))
        .bind(order.total().amount())
        .bind(OrderStatus::Pending)
        .bind(Json(order.address()))
        .bind(order.delivery_notes())
        .fetch_one(self.pool())
        .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool())
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user.as_uuid())
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_all(&self) -> Result<Vec<OwnedOrder>, RepositoryError> {
        let rows = sqlx::query_as::<_, OwnedOrderRow>(
            r"
            SELECT o.id, o.user_id, o.items, o.total, o.status, o.address,
                   o.delivery_notes, o.created_at, o.updated_at,
                   u.name AS owner_name, u.email AS owner_email
            FROM orders o
            LEFT JOIN users u ON u.id = o.user_id
            ORDER BY o.created_at DESC
            ",
        )
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE orders SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id.as_uuid())
        .bind(status)
        .fetch_optional(self.pool())
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use secrecy::SecretString;

    use super::*;
    use crate::db::{UserRepository, create_pool};
    use crate::models::{NewUser, PricedCart};

    fn line(price: &str, quantity: u32) -> OrderLineItem {
        OrderLineItem {
            product_id: ProductId::generate(),
            name: "Burrito".to_string(),
            quantity: Quantity::new(quantity).unwrap(),
            price: Price::new(Decimal::from_str(price).unwrap()).unwrap(),
        }
    }

    #[test]
    fn test_stored_items_keep_every_digit() {
        let item = line("12345678.123456789", 3);

        let json = serde_json::to_string(&stored_items(std::slice::from_ref(&item)).0).unwrap();
        assert!(json.contains("\"12345678.123456789\""));

        let stored: Vec<StoredLineItem> = serde_json::from_str(&json).unwrap();
        let back = OrderLineItem::try_from(stored.into_iter().next().unwrap()).unwrap();
        assert_eq!(back, item);
        assert_eq!(
            back.line_total().unwrap().amount(),
            Decimal::from_str("37037034.370370367").unwrap()
        );
    }

    #[test]
    fn test_negative_stored_price_is_corruption() {
        let stored: StoredLineItem = serde_json::from_value(serde_json::json!({
            "productId": ProductId::generate(),
            "name": "Broken",
            "quantity": 1,
            "price": "-1.00",
        }))
        .unwrap();

        assert!(matches!(
            OrderLineItem::try_from(stored),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    async fn store() -> PgStore {
        let url = std::env::var("STOREFRONT_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .unwrap();
        PgStore::new(create_pool(&SecretString::from(url)).await.unwrap())
    }

    async fn customer(store: &PgStore) -> UserId {
        let email = Email::parse(&format!("orders-{}@example.com", Uuid::new_v4())).unwrap();
        let user = UserRepository::create(
            store,
            NewUser {
                name: "Pg Orders".to_string(),
                email,
                password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
                is_admin: false,
            },
        )
        .await
        .unwrap();
        user.id
    }

    fn new_order(user: UserId, items: Vec<OrderLineItem>) -> NewOrder {
        NewOrder::new(
            user,
            PricedCart::from_line_items(items).unwrap(),
            DeliveryAddress::new("1 Main St", "Springfield", "IL", "62701").unwrap(),
            Some("Ring twice".to_string()),
        )
    }

    #[tokio::test]
    #[ignore = "Requires a running PostgreSQL database"]
    async fn test_create_and_read_back_exact_snapshot() {
        let store = store().await;
        let user = customer(&store).await;
        let items = vec![line("12345678.123456789", 3), line("9.50", 2)];

        let created = OrderRepository::create(&store, new_order(user, items.clone()))
            .await
            .unwrap();
        let found = OrderRepository::find_by_id(&store, created.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.items, items);
        assert_eq!(found.status, OrderStatus::Pending);
        assert_eq!(found.delivery_notes.as_deref(), Some("Ring twice"));

        let summed = found
            .items
            .iter()
            .try_fold(Price::ZERO, |acc, item| acc.checked_add(item.line_total()?))
            .unwrap();
        assert_eq!(summed, found.total);
        assert_eq!(
            found.total.amount(),
            Decimal::from_str("37037053.370370367").unwrap()
        );
    }

    #[tokio::test]
    #[ignore = "Requires a running PostgreSQL database"]
    async fn test_update_status_persists() {
        let store = store().await;
        let user = customer(&store).await;
        let created = OrderRepository::create(&store, new_order(user, vec![line("9.50", 1)]))
            .await
            .unwrap();

        let updated = store
            .update_status(created.id, OrderStatus::Delivered)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Delivered);
        assert_eq!(updated.items, created.items);

        let missing = store
            .update_status(OrderId::generate(), OrderStatus::Delivered)
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
