//! Persistence for the storefront.
//!
//! Handlers and services never talk to a database directly. They go through
//! the repository traits below, which are implemented twice:
//!
//! - [`PgStore`] over `PostgreSQL` (production)
//! - [`MemoryStore`] over in-process maps (tests and `STOREFRONT_STORE=memory`)
//!
//! # Tables
//!
//! - `users` - Accounts, with cart and saved addresses as JSONB
//! - `products` - Catalog, the source of truth for prices
//! - `orders` - Placed orders, with line items snapshotted as JSONB
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p curbside-cli -- migrate
//! ```

pub mod memory;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use curbside_core::{CartEntry, Email, OrderId, OrderStatus, ProductId, SavedAddress, UserId};

use crate::models::{NewOrder, NewUser, Order, OwnedOrder, Product, User};

pub use memory::MemoryStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Account storage.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a user by exact email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Look up a user by ID.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Insert a user.
    ///
    /// Returns `RepositoryError::Conflict` if the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Replace the user's cart wholesale, returning the stored cart.
    async fn replace_cart(
        &self,
        id: UserId,
        cart: &[CartEntry],
    ) -> Result<Vec<CartEntry>, RepositoryError>;

    /// Empty the user's cart.
    async fn clear_cart(&self, id: UserId) -> Result<(), RepositoryError>;

    /// Replace the user's saved addresses wholesale, returning the stored list.
    async fn replace_addresses(
        &self,
        id: UserId,
        addresses: &[SavedAddress],
    ) -> Result<Vec<SavedAddress>, RepositoryError>;

    /// Grant or revoke the administrator capability.
    async fn set_admin(&self, id: UserId, is_admin: bool) -> Result<User, RepositoryError>;
}

/// Read path to authoritative product data.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetch every listed product among `ids` in one round trip.
    ///
    /// IDs with no product are simply absent from the result.
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError>;

    /// Insert or replace a product. Used by tooling and tests.
    async fn upsert(&self, product: &Product) -> Result<(), RepositoryError>;
}

/// Order storage.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order with status `Pending`.
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    /// Look up an order by ID.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// A user's orders, newest first.
    async fn list_for_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// Every order with its owner, newest first.
    async fn list_all(&self) -> Result<Vec<OwnedOrder>, RepositoryError>;

    /// Overwrite the status and refresh `updated_at`.
    ///
    /// Returns `None` if the order does not exist.
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError>;
}

/// Backing-store liveness, used by the readiness probe.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Round-trip to the store.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL` implementation of every repository trait.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl HealthCheck for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Map a unique violation to `Conflict`, everything else to `Database`.
fn conflict_or_database(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
