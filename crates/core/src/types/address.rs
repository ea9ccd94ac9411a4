//! Delivery addresses.
//!
//! Orders copy the address by value; the user's saved addresses are a separate
//! list that checkout never references.

use serde::{Deserialize, Serialize};

/// Error returned when an address is missing a required field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// A required field is missing or blank.
    #[error("address field `{0}` is required")]
    MissingField(&'static str),
    /// More than one saved address claims to be the default.
    #[error("at most one address can be the default")]
    MultipleDefaults,
}

/// A complete street address. All four fields are non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    street: String,
    city: String,
    state: String,
    zip: String,
}

/// Address fields as a client submits them, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressInput {
    /// Street line.
    #[serde(default)]
    pub street: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// State or province.
    #[serde(default)]
    pub state: Option<String>,
    /// Postal code.
    #[serde(default)]
    pub zip: Option<String>,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, AddressError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_owned()),
        _ => Err(AddressError::MissingField(field)),
    }
}

impl DeliveryAddress {
    /// Build an address, requiring every field to be non-blank.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::MissingField` naming the first blank field.
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
    ) -> Result<Self, AddressError> {
        Self::try_from(AddressInput {
            street: Some(street.into()),
            city: Some(city.into()),
            state: Some(state.into()),
            zip: Some(zip.into()),
        })
    }

    /// Street line.
    #[must_use]
    pub fn street(&self) -> &str {
        &self.street
    }

    /// City.
    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// State or province.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Postal code.
    #[must_use]
    pub fn zip(&self) -> &str {
        &self.zip
    }
}

impl TryFrom<AddressInput> for DeliveryAddress {
    type Error = AddressError;

    fn try_from(input: AddressInput) -> Result<Self, Self::Error> {
        Ok(Self {
            street: required(input.street, "street")?,
            city: required(input.city, "city")?,
            state: required(input.state, "state")?,
            zip: required(input.zip, "zip")?,
        })
    }
}

/// An address in the user's address book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAddress {
    /// The address itself.
    #[serde(flatten)]
    pub address: DeliveryAddress,
    /// Whether this is the user's preferred address.
    #[serde(default)]
    pub default: bool,
}

/// A saved-address entry as a client submits it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SavedAddressInput {
    /// Address fields.
    #[serde(flatten)]
    pub address: AddressInput,
    /// Default flag.
    #[serde(default)]
    pub default: bool,
}

impl SavedAddress {
    /// Validate a whole address book.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::MissingField` for an incomplete entry and
    /// `AddressError::MultipleDefaults` if more than one entry is the default.
    pub fn validate_book(inputs: Vec<SavedAddressInput>) -> Result<Vec<Self>, AddressError> {
        let book = inputs
            .into_iter()
            .map(|input| {
                Ok(Self {
                    address: DeliveryAddress::try_from(input.address)?,
                    default: input.default,
                })
            })
            .collect::<Result<Vec<_>, AddressError>>()?;

        if book.iter().filter(|a| a.default).count() > 1 {
            return Err(AddressError::MultipleDefaults);
        }

        Ok(book)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fields_required() {
        assert!(DeliveryAddress::new("1 Main St", "Springfield", "IL", "62701").is_ok());
        assert_eq!(
            DeliveryAddress::new("1 Main St", "", "IL", "62701"),
            Err(AddressError::MissingField("city"))
        );
        assert_eq!(
            DeliveryAddress::new("1 Main St", "Springfield", "IL", "   "),
            Err(AddressError::MissingField("zip"))
        );
    }

    #[test]
    fn test_missing_json_field_is_reported() {
        let input: AddressInput =
            serde_json::from_value(serde_json::json!({"street": "1 Main St", "city": "X"}))
                .unwrap();
        assert_eq!(
            DeliveryAddress::try_from(input),
            Err(AddressError::MissingField("state"))
        );
    }

    #[test]
    fn test_book_rejects_two_defaults() {
        let entry = || SavedAddressInput {
            address: AddressInput {
                street: Some("1 Main St".into()),
                city: Some("Springfield".into()),
                state: Some("IL".into()),
                zip: Some("62701".into()),
            },
            default: true,
        };
        assert_eq!(
            SavedAddress::validate_book(vec![entry(), entry()]),
            Err(AddressError::MultipleDefaults)
        );
        assert_eq!(SavedAddress::validate_book(vec![entry()]).unwrap().len(), 1);
    }

    #[test]
    fn test_saved_address_serializes_flat() {
        let saved = SavedAddress {
            address: DeliveryAddress::new("1 Main St", "Springfield", "IL", "62701").unwrap(),
            default: true,
        };
        let json = serde_json::to_value(&saved).unwrap();
        assert_eq!(json["street"], "1 Main St");
        assert_eq!(json["default"], true);
    }
}
