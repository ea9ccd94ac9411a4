//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from database row types and
//! from the JSON shapes the HTTP layer emits.

pub mod order;
pub mod product;
pub mod user;

pub use order::{NewOrder, Order, OrderLineItem, OrderOwner, OwnedOrder, PricedCart};
pub use product::Product;
pub use user::{NewUser, User};
