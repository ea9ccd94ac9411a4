//! Field-level input validation errors.

use std::fmt;

use serde::{Deserialize, Serialize};

use curbside_core::{CartEntry, ProductId, Quantity};

/// One failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Human-readable message.
    pub msg: String,
    /// Dotted path of the offending field, e.g. `cart[1].quantity`.
    pub path: String,
}

/// Every field that failed validation for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// An empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// A set holding exactly one error.
    #[must_use]
    pub fn single(path: impl Into<String>, msg: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(path, msg);
        errors
    }

    /// Record a failing field.
    pub fn add(&mut self, path: impl Into<String>, msg: impl Into<String>) {
        self.errors.push(FieldError {
            msg: msg.into(),
            path: path.into(),
        });
    }

    /// Whether nothing failed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The first recorded message.
    #[must_use]
    pub fn first_message(&self) -> Option<&str> {
        self.errors.first().map(|e| e.msg.as_str())
    }

    /// All recorded errors, in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// `Ok(())` if nothing failed, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn finish(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.msg))
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// A cart line as a client submits it.
///
/// Quantity is taken as a signed integer so that zero and negative values
/// reach validation and get a field-level message. The product id is kept as
/// text so an id that is not a UUID is reported as an unknown product. Any
/// other fields the client sends (name, price) are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Product being purchased.
    pub product_id: String,
    /// Requested count.
    pub quantity: i64,
}

/// Why a submitted cart could not be turned into entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartInputError {
    /// One or more quantities are below 1.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// A product id that can never resolve to a catalog entry.
    #[error("product not found: {0}")]
    UnknownProduct(String),
}

/// Check every line of a submitted cart.
///
/// Quantity failures are collected across all lines first. After that, the
/// first line whose product id is not a valid identifier is reported.
///
/// # Errors
///
/// Returns `CartInputError::Validation` naming each line whose quantity is
/// below 1, or `CartInputError::UnknownProduct` with the raw id.
pub fn validate_cart(lines: &[CartLineInput]) -> Result<Vec<CartEntry>, CartInputError> {
    let mut errors = ValidationErrors::new();
    let mut quantities = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        match Quantity::try_from(line.quantity) {
            Ok(quantity) => quantities.push(quantity),
            Err(_) => errors.add(
                format!("cart[{i}].quantity"),
                "Quantity must be a positive integer",
            ),
        }
    }
    errors.finish()?;

    lines
        .iter()
        .zip(quantities)
        .map(|(line, quantity)| {
            line.product_id
                .trim()
                .parse::<ProductId>()
                .map(|id| CartEntry::new(id, quantity))
                .map_err(|_| CartInputError::UnknownProduct(line.product_id.clone()))
        })
        .collect()
}
