//! Checkout and order status.
//!
//! Checkout is two ordered writes: the order is created first, then the
//! owner's cart is cleared. If the second write fails the order stands and
//! the failure is only logged.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use curbside_core::{
    AddressError, AddressInput, CartEntry, DeliveryAddress, OrderId, OrderStatus, UserId,
};

use super::auth::{self, AuthError};
use super::pricing::{self, PricingError};
use crate::db::{OrderRepository, ProductCatalog, RepositoryError, UserRepository};
use crate::models::{NewOrder, Order, OwnedOrder, User};

/// Which status changes an administrator may make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Any of the four statuses may be set from any state.
    #[default]
    Permissive,
    /// Only the same status or the next one in the workflow.
    ForwardOnly,
}

impl StatusPolicy {
    /// Whether this policy allows moving from `from` to `to`.
    #[must_use]
    pub fn allows(self, from: OrderStatus, to: OrderStatus) -> bool {
        match self {
            Self::Permissive => true,
            Self::ForwardOnly => from.can_transition_to(to),
        }
    }
}

impl fmt::Display for StatusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permissive => write!(f, "permissive"),
            Self::ForwardOnly => write!(f, "forward_only"),
        }
    }
}

impl FromStr for StatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "forward_only" | "forward-only" => Ok(Self::ForwardOnly),
            other => Err(format!("expected permissive or forward_only, got {other:?}")),
        }
    }
}

/// Errors from checkout and status changes.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The cart could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The delivery address is incomplete.
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    /// No order with this ID.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// The status policy does not allow this move.
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },

    /// The caller lacks the administrator capability.
    #[error("administrator capability required")]
    Forbidden,

    /// Storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<AuthError> for OrderError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Repository(e) => Self::Repository(e),
            _ => Self::Forbidden,
        }
    }
}

/// Order service.
pub struct OrderService<'a> {
    orders: &'a dyn OrderRepository,
    users: &'a dyn UserRepository,
    catalog: &'a dyn ProductCatalog,
    policy: StatusPolicy,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(
        orders: &'a dyn OrderRepository,
        users: &'a dyn UserRepository,
        catalog: &'a dyn ProductCatalog,
        policy: StatusPolicy,
    ) -> Self {
        Self {
            orders,
            users,
            catalog,
            policy,
        }
    }

    /// Price the cart, persist the order, then clear the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidAddress` for an incomplete address,
    /// `OrderError::Pricing` if the cart is empty or names an unknown
    /// product, and `OrderError::Repository` if the order write fails. A
    /// failed cart clear is not an error.
    pub async fn place_order(
        &self,
        user: UserId,
        cart: &[CartEntry],
        address: AddressInput,
        delivery_notes: Option<String>,
    ) -> Result<Order, OrderError> {
        let address = DeliveryAddress::try_from(address)?;
        let priced = pricing::price_cart(cart, self.catalog).await?;

        let order = self
            .orders
            .create(NewOrder::new(user, priced, address, delivery_notes))
            .await?;

        tracing::info!(
            order_id = %order.id,
            user_id = %user,
            total = %order.total,
            items = order.items.len(),
            "Order placed"
        );

        if let Err(e) = self.users.clear_cart(user).await {
            tracing::warn!(
                order_id = %order.id,
                user_id = %user,
                error = %e,
                "Order placed but cart could not be cleared"
            );
        }

        Ok(order)
    }

    /// The user's own orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` on storage failure.
    pub async fn list_mine(&self, user: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_for_user(user).await?)
    }

    /// Every order with its owner, newest first. Administrators only.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Forbidden` for a non-administrator.
    pub async fn list_all(&self, actor: &User) -> Result<Vec<OwnedOrder>, OrderError> {
        auth::require_admin(actor)?;
        Ok(self.orders.list_all().await?)
    }

    /// Set an order's status. Administrators only.
    ///
    /// Setting the status an order already has succeeds and changes nothing
    /// but the update timestamp.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Forbidden` for a non-administrator,
    /// `OrderError::OrderNotFound` if the order does not exist, and
    /// `OrderError::InvalidTransition` if the configured policy rejects the
    /// move.
    pub async fn set_status(
        &self,
        actor: &User,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        auth::require_admin(actor)?;

        if self.policy == StatusPolicy::ForwardOnly {
            let current = self
                .orders
                .find_by_id(id)
                .await?
                .ok_or(OrderError::OrderNotFound(id))?;

            if !self.policy.allows(current.status, status) {
                return Err(OrderError::InvalidTransition {
                    from: current.status,
                    to: status,
                });
            }
        }

        let order = self
            .orders
            .update_status(id, status)
            .await?
            .ok_or(OrderError::OrderNotFound(id))?;

        tracing::info!(
            order_id = %id,
            admin_id = %actor.id,
            status = %status,
            "Order status updated"
        );

        Ok(order)
    }
}
