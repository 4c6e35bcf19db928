//! Sukoon Core - Shared types library.
//!
//! This crate provides common types used across all Sukoon Shop components:
//! - `storefront` - Catalog, pricing, auth and admin client library
//! - `cli` - Command-line front end driving the storefront
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices and currencies, credentials, view states

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
