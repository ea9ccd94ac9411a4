//! CLI command implementations.

pub mod admin;
pub mod migrate;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Primary connection string variable.
pub const DATABASE_URL_VAR: &str = "STOREFRONT_DATABASE_URL";

/// Errors opening the storefront database.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Neither `STOREFRONT_DATABASE_URL` nor `DATABASE_URL` is set.
    #[error("Missing environment variable: {DATABASE_URL_VAR}")]
    MissingDatabaseUrl,

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the storefront database named by the environment.
///
/// # Errors
///
/// Returns `ConnectError` if no URL is configured or the pool cannot connect.
pub async fn connect() -> Result<PgPool, ConnectError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var(DATABASE_URL_VAR)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConnectError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to storefront database...");
    Ok(curbside_storefront::db::create_pool(&database_url).await?)
}
