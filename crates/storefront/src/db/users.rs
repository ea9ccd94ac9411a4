//! `PostgreSQL` user repository.
//!
//! Queries are checked at runtime (`query_as` into private row types) so the
//! crate builds without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use curbside_core::{CartEntry, Email, SavedAddress, UserId};

use super::{PgStore, RepositoryError, UserRepository, conflict_or_database};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, is_admin, addresses, cart, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    is_admin: bool,
    addresses: Json<Vec<SavedAddress>>,
    cart: Json<Vec<CartEntry>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        if row.password_hash.is_empty() {
            return Err(RepositoryError::DataCorruption(format!(
                "user {} has no password hash",
                row.id
            )));
        }

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
            password_hash: row.password_hash,
            is_admin: row.is_admin,
            addresses: row.addresses.0,
            cart: row.cart.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool())
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool())
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO users (id, name, email, password_hash, is_admin)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .fetch_one(self.pool())
        .await
        .map_err(|e| conflict_or_database(e, "email"))?;

        row.try_into()
    }

    async fn replace_cart(
        &self,
        id: UserId,
        cart: &[CartEntry],
    ) -> Result<Vec<CartEntry>, RepositoryError> {
        let stored: Option<(Json<Vec<CartEntry>>,)> = sqlx::query_as(
            r"
            UPDATE users SET cart = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING cart
            ",
        )
        .bind(id.as_uuid())
        .bind(Json(cart))
        .fetch_optional(self.pool())
        .await?;

        stored
            .map(|(cart,)| cart.0)
            .ok_or(RepositoryError::NotFound)
    }

    async fn clear_cart(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET cart = '[]'::jsonb, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_uuid())
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn replace_addresses(
        &self,
        id: UserId,
        addresses: &[SavedAddress],
    ) -> Result<Vec<SavedAddress>, RepositoryError> {
        let stored: Option<(Json<Vec<SavedAddress>>,)> = sqlx::query_as(
            r"
            UPDATE users SET addresses = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING addresses
            ",
        )
        .bind(id.as_uuid())
        .bind(Json(addresses))
        .fetch_optional(self.pool())
        .await?;

        stored
            .map(|(addresses,)| addresses.0)
            .ok_or(RepositoryError::NotFound)
    }

    async fn set_admin(&self, id: UserId, is_admin: bool) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            UPDATE users SET is_admin = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(id.as_uuid())
        .bind(is_admin)
        .fetch_optional(self.pool())
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }
}
