//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. `AppError` turns domain
//! failures into a JSON body of the form
//!
//! ```json
//! { "message": "Invalid status", "errors": [ { "msg": "...", "path": "..." } ] }
//! ```
//!
//! where `errors` only appears for validation failures. Diagnostic text is
//! attached to the response as an [`ErrorDetail`] extension; the
//! `error_detail` middleware copies it into the body outside production.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use curbside_core::{AddressError, OrderId, OrderStatus};

use crate::db::RepositoryError;
use crate::services::account::AccountError;
use crate::services::auth::AuthError;
use crate::services::orders::OrderError;
use crate::services::pricing::PricingError;
use crate::services::validation::{CartInputError, FieldError, ValidationErrors};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Registration with an email that is already taken.
    #[error("user already exists")]
    DuplicateEmail,

    /// Login failed. Does not say which half was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No usable bearer token.
    #[error("not authenticated")]
    Unauthenticated,

    /// Authenticated, but not an administrator.
    #[error("administrator capability required")]
    Forbidden,

    /// A cart names a product the catalog does not list.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// Incomplete delivery address.
    #[error("invalid address: {0}")]
    InvalidAddress(AddressError),

    /// Status literal outside the workflow.
    #[error("invalid status: {0:?}")]
    InvalidStatus(String),

    /// The configured status policy rejected the move.
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },

    /// No order with this ID.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// No route matches the request path.
    #[error("no route for {0}")]
    NotFound(String),

    /// Rate limited.
    #[error("rate limited")]
    RateLimited,

    /// Store or infrastructure fault.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Diagnostic text for the `detail` field of an error body.
///
/// Inserted as a response extension on every error response.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable summary.
    pub message: String,
    /// Per-field failures, for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl AppError {
    /// The HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::DuplicateEmail
            | Self::ProductNotFound(_)
            | Self::InvalidAddress(_)
            | Self::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::OrderNotFound(_) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let message = match self {
            Self::Validation(errors) => errors
                .first_message()
                .unwrap_or("Invalid request")
                .to_string(),
            Self::DuplicateEmail => "User already exists".to_string(),
            Self::InvalidCredentials => "Invalid email or password".to_string(),
            Self::Unauthenticated => "Not authorized".to_string(),
            Self::Forbidden => "Not authorized as an admin".to_string(),
            Self::ProductNotFound(id) => format!("Product not found: {id}"),
            Self::InvalidAddress(_) => "Invalid address".to_string(),
            Self::InvalidStatus(_) => "Invalid status".to_string(),
            Self::InvalidTransition { from, to } => {
                format!("Cannot change status from {from} to {to}")
            }
            Self::OrderNotFound(_) => "Order not found".to_string(),
            Self::NotFound(path) => format!("Not Found - {path}"),
            Self::RateLimited => "Too many requests, please try again later".to_string(),
            Self::Internal(_) => "Server Error".to_string(),
        };

        let errors = match self {
            Self::Validation(errors) => Some(errors.errors().to_vec()),
            _ => None,
        };

        ErrorBody { message, errors }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = %self.status(), "Request rejected");
        }

        let mut response = (self.status(), Json(self.body())).into_response();
        response
            .extensions_mut()
            .insert(ErrorDetail(self.to_string()));
        response
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(errors) => Self::Validation(errors),
            AuthError::UserAlreadyExists => Self::DuplicateEmail,
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::Unauthenticated => Self::Unauthenticated,
            AuthError::Forbidden => Self::Forbidden,
            AuthError::Token(e) => Self::Internal(e.to_string()),
            AuthError::Repository(e) => e.into(),
            AuthError::PasswordHash => Self::Internal("password hashing failed".to_string()),
        }
    }
}

impl From<PricingError> for AppError {
    fn from(e: PricingError) -> Self {
        match e {
            PricingError::EmptyCart => Self::Validation(ValidationErrors::single(
                "cart",
                "No items in cart",
            )),
            PricingError::ProductNotFound(id) => Self::ProductNotFound(id.to_string()),
            PricingError::Arithmetic(e) => Self::Internal(e.to_string()),
            PricingError::Catalog(e) => e.into(),
        }
    }
}

impl From<CartInputError> for AppError {
    fn from(e: CartInputError) -> Self {
        match e {
            CartInputError::Validation(errors) => Self::Validation(errors),
            CartInputError::UnknownProduct(id) => Self::ProductNotFound(id),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::Pricing(e) => e.into(),
            OrderError::InvalidAddress(e) => Self::InvalidAddress(e),
            OrderError::OrderNotFound(id) => Self::OrderNotFound(id),
            OrderError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
            OrderError::Forbidden => Self::Forbidden,
            OrderError::Repository(e) => e.into(),
        }
    }
}

impl From<AccountError> for AppError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::Validation(errors) => Self::Validation(errors),
            AccountError::ProductNotFound(id) => Self::ProductNotFound(id),
            AccountError::InvalidAddress(e) => Self::InvalidAddress(e),
            AccountError::Repository(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(ValidationErrors::single("body", rejection.body_text()))
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Called once a bearer token has been resolved, so errors raised later in
/// the request are associated with the user.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("checkout", "Order placed", Some(&[("order_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
