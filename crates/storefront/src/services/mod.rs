//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration, login, token issue and verification
//! - `pricing` - Turns a submitted cart into priced line items
//! - `orders` - Checkout and the order status workflow
//! - `account` - Cart and saved-address maintenance
//! - `validation` - Field-level input errors shared by the above

pub mod account;
pub mod auth;
pub mod orders;
pub mod pricing;
pub mod validation;
