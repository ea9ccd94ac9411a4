//! Curbside Core - Shared domain types.
//!
//! This crate provides the types used across all Curbside components:
//! - `storefront` - The order-taking HTTP backend
//! - `cli` - Command-line tools for migrations and administrator management
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database access,
//! no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, prices, quantities, addresses and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
