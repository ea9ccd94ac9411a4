//! Non-negative price representation using decimal arithmetic.
//!
//! Prices never pass through floating point: multiplication and summation are
//! exact at the precision the catalog stores, and no rounding step is applied.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::Quantity;

/// Errors produced by [`Price`] construction and arithmetic.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Prices cannot be negative.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
    /// The result does not fit in a decimal.
    #[error("price arithmetic overflowed")]
    Overflow,
}

/// A non-negative monetary amount in the store's single currency.
///
/// Serialized as a JSON number; deserializes from a number or a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Price(#[serde(serialize_with = "rust_decimal::serde::float::serialize")] Decimal);

impl Price {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount < 0`.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from an integer number of cents.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `cents < 0`.
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// `self * quantity`, exactly.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the product is not representable.
    pub fn times(self, quantity: Quantity) -> Result<Self, PriceError> {
        self.0
            .checked_mul(Decimal::from(quantity.get()))
            .map(Self)
            .ok_or(PriceError::Overflow)
    }

    /// `self + other`, exactly.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the sum is not representable.
    pub fn checked_add(self, other: Self) -> Result<Self, PriceError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(PriceError::Overflow)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative() {
        assert!(matches!(
            Price::from_cents(-1),
            Err(PriceError::Negative(_))
        ));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_times_is_exact() {
        let price = Price::from_cents(950).unwrap();
        let line = price.times(Quantity::new(2).unwrap()).unwrap();
        assert_eq!(line, Price::from_cents(1900).unwrap());
    }

    #[test]
    fn test_tenths_do_not_drift() {
        // 0.1 * 3 is 0.3 exactly, unlike f64
        let dime = Price::new(Decimal::new(1, 1)).unwrap();
        let total = dime.times(Quantity::new(3).unwrap()).unwrap();
        assert_eq!(total.amount(), Decimal::new(3, 1));
    }

    #[test]
    fn test_serializes_as_number() {
        let price = Price::from_cents(950).unwrap();
        let json = serde_json::to_value(price).unwrap();
        assert_eq!(json, serde_json::json!(9.5));
    }

    #[test]
    fn test_deserializes_from_number_and_string() {
        let from_number: Price = serde_json::from_str("9.5").unwrap();
        let from_string: Price = serde_json::from_str("\"9.50\"").unwrap();
        assert_eq!(from_number, from_string);
        assert!(serde_json::from_str::<Price>("-1").is_err());
    }

    #[test]
    fn test_display_two_places() {
        assert_eq!(Price::from_cents(1900).unwrap().to_string(), "19.00");
    }
}
