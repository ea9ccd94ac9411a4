//! Order aggregate.
//!
//! An order is created exactly once at checkout from a [`PricedCart`] and is
//! afterwards only touched by status changes. Line items are snapshots: they
//! carry the name and price the catalog listed at checkout time and never
//! refer back to the live product.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use curbside_core::{
    DeliveryAddress, Email, OrderId, OrderStatus, Price, PriceError, ProductId, Quantity, UserId,
};

/// One purchased product, frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    /// Product that was purchased.
    pub product_id: ProductId,
    /// Catalog name at checkout.
    pub name: String,
    /// Units purchased.
    pub quantity: Quantity,
    /// Catalog unit price at checkout.
    pub price: Price,
}

impl OrderLineItem {
    /// `price * quantity`.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the product is not representable.
    pub fn line_total(&self) -> Result<Price, PriceError> {
        self.price.times(self.quantity)
    }
}

/// Line items together with the total they sum to.
///
/// The total is computed here and nowhere else, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    items: Vec<OrderLineItem>,
    total: Price,
}

impl PricedCart {
    /// Sum the line items in the order given.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the total is not representable.
    pub fn from_line_items(items: Vec<OrderLineItem>) -> Result<Self, PriceError> {
        let total = items
            .iter()
            .try_fold(Price::ZERO, |acc, item| acc.checked_add(item.line_total()?))?;
        Ok(Self { items, total })
    }

    /// The priced line items.
    #[must_use]
    pub fn items(&self) -> &[OrderLineItem] {
        &self.items
    }

    /// Sum of `price * quantity` over the line items.
    #[must_use]
    pub const fn total(&self) -> Price {
        self.total
    }
}

/// An order ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    user: UserId,
    priced: PricedCart,
    address: DeliveryAddress,
    delivery_notes: Option<String>,
}

impl NewOrder {
    /// Assemble an order for `user` from a priced cart.
    ///
    /// Blank delivery notes are dropped.
    #[must_use]
    pub fn new(
        user: UserId,
        priced: PricedCart,
        address: DeliveryAddress,
        delivery_notes: Option<String>,
    ) -> Self {
        Self {
            user,
            priced,
            address,
            delivery_notes: delivery_notes.filter(|notes| !notes.trim().is_empty()),
        }
    }

    /// Owning user.
    #[must_use]
    pub const fn user(&self) -> UserId {
        self.user
    }

    /// Line items.
    #[must_use]
    pub fn items(&self) -> &[OrderLineItem] {
        self.priced.items()
    }

    /// Order total.
    #[must_use]
    pub const fn total(&self) -> Price {
        self.priced.total()
    }

    /// Delivery address.
    #[must_use]
    pub const fn address(&self) -> &DeliveryAddress {
        &self.address
    }

    /// Optional delivery notes.
    #[must_use]
    pub fn delivery_notes(&self) -> Option<&str> {
        self.delivery_notes.as_deref()
    }

    /// Materialize the persisted order with a fresh ID and timestamps.
    #[must_use]
    pub fn into_order(self, id: OrderId, now: DateTime<Utc>) -> Order {
        Order {
            id,
            user: self.user,
            items: self.priced.items,
            total: self.priced.total,
            status: OrderStatus::Pending,
            address: self.address,
            delivery_notes: self.delivery_notes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order ID.
    #[serde(rename = "_id")]
    pub id: OrderId,
    /// Owning user. Set once at creation.
    pub user: UserId,
    /// Line item snapshots.
    pub items: Vec<OrderLineItem>,
    /// Sum of the line items at checkout. Never recomputed.
    pub total: Price,
    /// Workflow status.
    pub status: OrderStatus,
    /// Delivery address, copied by value.
    pub address: DeliveryAddress,
    /// Free-form notes for the courier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_notes: Option<String>,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// When the order was last modified.
    pub updated_at: DateTime<Utc>,
}

/// The owner fields shown next to an order in staff listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderOwner {
    /// User ID.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Email,
}

/// An order with its owner resolved.
///
/// `owner` is `None` when the owning user no longer exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedOrder {
    /// The order.
    pub order: Order,
    /// The owning user's summary.
    pub owner: Option<OrderOwner>,
}
