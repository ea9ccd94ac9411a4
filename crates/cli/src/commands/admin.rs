//! Administrator management commands.
//!
//! Administrators are ordinary users with the administrator flag set. There
//! is no HTTP route that grants the flag; these commands are the only way.
//!
//! # Usage
//!
//! ```bash
//! # Create a new administrator with a password
//! curbside-cli admin create -e admin@example.com -n "Admin Name" -p 'long-password'
//!
//! # Grant the flag to an existing user
//! curbside-cli admin promote -e someone@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//! - `CURBSIDE_ADMIN_PASSWORD` - Password for `admin create` if `-p` is omitted

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use curbside_core::{Email, UserId};
use curbside_storefront::db::{PgStore, RepositoryError, UserRepository};
use curbside_storefront::models::NewUser;
use curbside_storefront::services::auth::{AuthError, PasswordField, password};

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Could not reach the database.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Blank display name.
    #[error("Name is required")]
    MissingName,

    /// Password below the minimum length.
    #[error("Password must be {} or more characters", password::MIN_PASSWORD_LENGTH)]
    WeakPassword,

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),

    /// No user with this email.
    #[error("No user with email: {0}")]
    UserNotFound(String),

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hash(#[from] AuthError),

    /// Repository error.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

fn parse_email(email: &str) -> Result<Email, AdminError> {
    Email::parse(email.trim()).map_err(|_| AdminError::InvalidEmail(email.to_owned()))
}

/// Create a new administrator.
///
/// # Arguments
///
/// * `email` - Administrator's email address
/// * `name` - Administrator's display name
/// * `password` - Initial password, hashed before it is stored
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `AdminError` if validation fails, the email is taken, or the
/// database is unreachable.
pub async fn create_user(
    email: &str,
    name: &str,
    password: SecretString,
) -> Result<UserId, AdminError> {
    let email = parse_email(email)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(AdminError::MissingName);
    }
    if !password::meets_length_requirement(password.expose_secret()) {
        return Err(AdminError::WeakPassword);
    }

    let store = PgStore::new(connect().await?);

    tracing::info!(email = %email, "Creating administrator");

    let password_hash = PasswordField::Plain(password).into_hash()?;
    let user = store
        .create(NewUser {
            name: name.to_owned(),
            email: email.clone(),
            password_hash,
            is_admin: true,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AdminError::UserExists(email.to_string()),
            other => AdminError::Repository(other),
        })?;

    tracing::info!(user_id = %user.id, email = %user.email, "Administrator created");
    Ok(user.id)
}

/// Grant the administrator flag to an existing user.
///
/// # Errors
///
/// Returns `AdminError::UserNotFound` if no user has this email.
pub async fn promote(email: &str) -> Result<UserId, AdminError> {
    let email = parse_email(email)?;
    let store = PgStore::new(connect().await?);

    let user = store
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AdminError::UserNotFound(email.to_string()))?;

    if user.is_admin {
        tracing::info!(user_id = %user.id, "User is already an administrator");
        return Ok(user.id);
    }

    let user = store.set_admin(user.id, true).await?;
    tracing::info!(user_id = %user.id, email = %user.email, "User promoted to administrator");
    Ok(user.id)
}
