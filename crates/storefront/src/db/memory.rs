//! In-process store.
//!
//! Implements every repository trait over `tokio::sync::RwLock`-guarded maps.
//! Nothing is persisted. Used by the test suites and by
//! `STOREFRONT_STORE=memory` for running the API without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use curbside_core::{CartEntry, Email, OrderId, OrderStatus, ProductId, SavedAddress, UserId};

use super::{HealthCheck, OrderRepository, ProductCatalog, RepositoryError, UserRepository};
use crate::models::{NewOrder, NewUser, Order, OrderOwner, OwnedOrder, Product, User};

/// In-memory implementation of the repository traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    products: RwLock<HashMap<ProductId, Product>>,
    /// Insertion order doubles as creation order.
    orders: RwLock<Vec<Order>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn modify_user<T>(
        &self,
        id: UserId,
        f: impl FnOnce(&mut User) -> T + Send,
    ) -> Result<T, RepositoryError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        let out = f(user);
        user.updated_at = Utc::now();
        Ok(out)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| &u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let now = Utc::now();
        let created = User {
            id: UserId::generate(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            is_admin: user.is_admin,
            addresses: Vec::new(),
            cart: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn replace_cart(
        &self,
        id: UserId,
        cart: &[CartEntry],
    ) -> Result<Vec<CartEntry>, RepositoryError> {
        let cart = cart.to_vec();
        self.modify_user(id, move |user| {
            user.cart = cart;
            user.cart.clone()
        })
        .await
    }

    async fn clear_cart(&self, id: UserId) -> Result<(), RepositoryError> {
        self.modify_user(id, |user| user.cart.clear()).await
    }

    async fn replace_addresses(
        &self,
        id: UserId,
        addresses: &[SavedAddress],
    ) -> Result<Vec<SavedAddress>, RepositoryError> {
        let addresses = addresses.to_vec();
        self.modify_user(id, move |user| {
            user.addresses = addresses;
            user.addresses.clone()
        })
        .await
    }

    async fn set_admin(&self, id: UserId, is_admin: bool) -> Result<User, RepositoryError> {
        self.modify_user(id, |user| {
            user.is_admin = is_admin;
            user.clone()
        })
        .await
    }
}

#[async_trait]
impl ProductCatalog for MemoryStore {
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }

    async fn upsert(&self, product: &Product) -> Result<(), RepositoryError> {
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let order = order.into_order(OrderId::generate(), Utc::now());
        self.orders.write().await.push(order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders.iter().rev().filter(|o| o.user == user).cloned().collect())
    }

    async fn list_all(&self) -> Result<Vec<OwnedOrder>, RepositoryError> {
        let orders = self.orders.read().await;
        let users = self.users.read().await;

        Ok(orders
            .iter()
            .rev()
            .map(|order| OwnedOrder {
                order: order.clone(),
                owner: users.get(&order.user).map(|u| OrderOwner {
                    id: u.id,
                    name: u.name.clone(),
                    email: u.email.clone(),
                }),
            })
            .collect())
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut orders = self.orders.write().await;
        Ok(orders.iter_mut().find(|o| o.id == id).map(|order| {
            order.status = status;
            order.updated_at = Utc::now();
            order.clone()
        }))
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
