//! Authentication service.
//!
//! Registration and login hand back a signed token; every protected request
//! resolves that token back to a stored user. The administrator check is a
//! separate step that only ever runs on an already-resolved user.

mod error;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use password::PasswordField;
pub use token::{Claims, TokenError, TokenIssuer};

use secrecy::{ExposeSecret, SecretString};

use curbside_core::Email;

use crate::db::{RepositoryError, UserRepository};
use crate::models::{NewUser, User};
use crate::services::validation::ValidationErrors;

const INVALID_EMAIL: &str = "Please include a valid email";

/// A user together with a freshly issued token.
#[derive(Debug, Clone)]
pub struct SignedIn {
    /// The authenticated user.
    pub user: User,
    /// Bearer token bound to `user.id`.
    pub token: String,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: &'a dyn UserRepository,
    tokens: &'a TokenIssuer,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn UserRepository, tokens: &'a TokenIssuer) -> Self {
        Self { users, tokens }
    }

    /// Register a new user with name, email and password.
    ///
    /// The password is hashed exactly once, before the user is persisted.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the name is blank, the email is
    /// malformed, or the password is too short. Returns
    /// `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: SecretString,
    ) -> Result<SignedIn, AuthError> {
        let mut errors = ValidationErrors::new();
        let name = name.trim();
        if name.is_empty() {
            errors.add("name", "Name is required");
        }
        let email = Email::parse(email.trim()).ok();
        if email.is_none() {
            errors.add("email", INVALID_EMAIL);
        }
        if !password::meets_length_requirement(password.expose_secret()) {
            errors.add(
                "password",
                format!(
                    "Password must be {} or more characters",
                    password::MIN_PASSWORD_LENGTH
                ),
            );
        }
        errors.finish()?;
        let email = email.ok_or_else(|| ValidationErrors::single("email", INVALID_EMAIL))?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let user = self
            .create_user(name, email, PasswordField::Plain(password), false)
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        self.sign_in(user)
    }

    /// Persist a user, hashing the password first if it is dirty.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the email is taken and
    /// `AuthError::PasswordHash` if hashing fails.
    pub async fn create_user(
        &self,
        name: &str,
        email: Email,
        password: PasswordField,
        is_admin: bool,
    ) -> Result<User, AuthError> {
        let password_hash = password.into_hash()?;

        self.users
            .create(NewUser {
                name: name.to_owned(),
                email,
                password_hash,
                is_admin,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Login with email and password.
    ///
    /// Unknown email and wrong password produce the same error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a malformed email or empty
    /// password, and `AuthError::InvalidCredentials` if the email/password is
    /// wrong.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SignedIn, AuthError> {
        let mut errors = ValidationErrors::new();
        let email = Email::parse(email.trim()).ok();
        if email.is_none() {
            errors.add("email", INVALID_EMAIL);
        }
        if password.expose_secret().is_empty() {
            errors.add("password", "Password is required");
        }
        errors.finish()?;
        let email = email.ok_or_else(|| ValidationErrors::single("email", INVALID_EMAIL))?;

        let Some(user) = self.users.find_by_email(&email).await? else {
            return Err(password::reject_unknown_account(password.expose_secret()));
        };

        password::verify_password(password.expose_secret(), &user.password_hash)?;

        tracing::info!(user_id = %user.id, "User logged in");
        self.sign_in(user)
    }

    /// Resolve a bearer token to the user it names.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthenticated` if the token does not verify or
    /// the user no longer exists.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AuthError::Unauthenticated
        })?;

        self.users
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::Unauthenticated)
    }

    fn sign_in(&self, user: User) -> Result<SignedIn, AuthError> {
        let token = self.tokens.issue(user.id)?;
        Ok(SignedIn { user, token })
    }
}

/// Require the administrator capability on a resolved user.
///
/// # Errors
///
/// Returns `AuthError::Forbidden` unless `user.is_admin`.
pub fn require_admin(user: &User) -> Result<(), AuthError> {
    if user.is_admin {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}
