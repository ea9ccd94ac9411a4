//! Core types for Curbside.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod cart;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use address::{AddressError, AddressInput, DeliveryAddress, SavedAddress, SavedAddressInput};
pub use cart::{CartEntry, Quantity, QuantityError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use status::{OrderStatus, UnknownStatus};
