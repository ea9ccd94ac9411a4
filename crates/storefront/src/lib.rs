//! Curbside Storefront library.
//!
//! The order-taking HTTP API as a library, so the binary, the CLI, and the
//! integration tests share one implementation.
//!
//! # Modules
//!
//! - [`app`] - Router assembly
//! - [`config`] - Environment configuration
//! - [`db`] - Repository traits with `PostgreSQL` and in-memory stores
//! - [`services`] - Auth, pricing, checkout and status workflow
//! - [`routes`] / [`middleware`] - HTTP surface

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
