//! Password hashing.
//!
//! Hashing is an explicit step taken by whoever builds a [`NewUser`]: the
//! password travels as a [`PasswordField`] and is only hashed when it is
//! dirty (freshly supplied in plain text).
//!
//! [`NewUser`]: crate::models::NewUser

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};

use super::AuthError;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Hash verified against when the email matches no account, so that path
/// costs the same Argon2 work as a wrong password.
static UNKNOWN_ACCOUNT_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("unknown-account-placeholder").ok());

/// A user's password as it moves toward persistence.
pub enum PasswordField {
    /// Already hashed; persisted as is.
    Hashed(String),
    /// Supplied in plain text; must be hashed before persistence.
    Plain(SecretString),
}

impl PasswordField {
    /// Whether the field holds a plain-text password that still needs hashing.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        matches!(self, Self::Plain(_))
    }

    /// Produce the value to persist, hashing only if dirty.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing fails.
    pub fn into_hash(self) -> Result<String, AuthError> {
        match self {
            Self::Hashed(hash) => Ok(hash),
            Self::Plain(password) => hash_password(password.expose_secret()),
        }
    }
}

/// Whether a password is long enough.
#[must_use]
pub fn meets_length_requirement(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// An empty or unparseable hash never verifies.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on any mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    if hash.is_empty() {
        return Err(AuthError::InvalidCredentials);
    }
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Reject a login whose email matched no account.
///
/// Runs a full verification against a fixed hash first and always returns
/// `AuthError::InvalidCredentials`, whatever the password.
pub fn reject_unknown_account(password: &str) -> AuthError {
    if let Some(hash) = UNKNOWN_ACCOUNT_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    AuthError::InvalidCredentials
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash).is_ok());
        assert!(matches!(
            verify_password("hunter23", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hash_is_salted() {
        assert_ne!(
            hash_password("same-password").unwrap(),
            hash_password("same-password").unwrap()
        );
    }

    #[test]
    fn test_empty_hash_never_verifies() {
        assert!(verify_password("", "").is_err());
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_only_dirty_field_is_hashed() {
        let clean = PasswordField::Hashed("$argon2id$existing".to_string());
        assert!(!clean.is_dirty());
        assert_eq!(clean.into_hash().unwrap(), "$argon2id$existing");

        let dirty = PasswordField::Plain(SecretString::from("hunter22"));
        assert!(dirty.is_dirty());
        let hash = dirty.into_hash().unwrap();
        assert_ne!(hash, "hunter22");
        assert!(verify_password("hunter22", &hash).is_ok());
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(!meets_length_requirement("12345"));
        assert!(meets_length_requirement("123456"));
        assert!(meets_length_requirement("éééééé"));
    }

    #[test]
    fn test_unknown_account_hash_is_a_real_argon2_hash() {
        let hash = UNKNOWN_ACCOUNT_HASH.as_deref().unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("unknown-account-placeholder", hash).is_ok());
    }

    #[test]
    fn test_unknown_account_always_rejected() {
        for password in ["", "hunter22", "unknown-account-placeholder"] {
            assert!(matches!(
                reject_unknown_account(password),
                AuthError::InvalidCredentials
            ));
        }
    }
}
