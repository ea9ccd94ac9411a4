//! Cart entries as submitted by clients and stored on the user.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Error returned when a quantity is not a positive integer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("quantity must be a positive integer (got {0})")]
pub struct QuantityError(pub i64);

/// A positive item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// Create a quantity, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError` if `n == 0`.
    pub fn new(n: u32) -> Result<Self, QuantityError> {
        NonZeroU32::new(n)
            .map(Self)
            .ok_or(QuantityError(i64::from(n)))
    }

    /// The count as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(QuantityError(value))
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One `{productId, quantity}` pair.
///
/// Any other fields a client sends alongside (name, price, ...) are dropped
/// during deserialization and never reach pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    /// Product being purchased.
    pub product_id: ProductId,
    /// How many units.
    pub quantity: Quantity,
}

impl CartEntry {
    /// Create a cart entry.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: Quantity) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}
