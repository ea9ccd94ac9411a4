//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! curbside-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Embedded at build time from `crates/storefront/migrations/`:
//! ```text
//! migrations/
//! ├── 20250601000001_create_users.sql
//! ├── 20250601000002_create_products.sql
//! └── 20250601000003_create_orders.sql
//! ```

use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Could not reach the database.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration
/// fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Storefront migrations complete");
    Ok(())
}
