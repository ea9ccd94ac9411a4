//! Authentication error types.

use thiserror::Error;

use super::token::TokenError;
use crate::db::RepositoryError;
use crate::services::validation::ValidationErrors;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration or login input failed validation.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    /// Email is already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Unknown email or wrong password. Deliberately undifferentiated.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, expired, or foreign token, or the user is gone.
    #[error("not authenticated")]
    Unauthenticated,

    /// Caller is authenticated but lacks the administrator capability.
    #[error("administrator capability required")]
    Forbidden,

    /// Token could not be signed.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
