//! User domain types.

use chrono::{DateTime, Utc};

use curbside_core::{CartEntry, Email, SavedAddress, UserId};

/// A registered user (customer or staff).
#[derive(Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address, unique and compared exactly as stored.
    pub email: Email,
    /// Argon2id PHC string. Never the raw password.
    pub password_hash: String,
    /// Administrator capability.
    pub is_admin: bool,
    /// Saved delivery addresses, in the order the user gave them.
    pub addresses: Vec<SavedAddress>,
    /// Current cart.
    pub cart: Vec<CartEntry>,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last modified.
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("is_admin", &self.is_admin)
            .field("addresses", &self.addresses)
            .field("cart", &self.cart)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// A user about to be inserted. The password has already been hashed.
#[derive(Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Email,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Administrator capability.
    pub is_admin: bool,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("is_admin", &self.is_admin)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password_hash() {
        let user = NewUser {
            name: "Ada".to_string(),
            email: Email::parse("ada@example.com").unwrap(),
            password_hash: "$argon2id$v=19$super-secret-hash".to_string(),
            is_admin: false,
        };

        let debug_output = format!("{user:?}");
        assert!(debug_output.contains("ada@example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-hash"));
    }
}
