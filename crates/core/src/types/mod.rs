//! Core types for Sukoon Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod account;
pub mod id;
pub mod price;
pub mod view;

pub use account::{CredentialError, Email, Password};
pub use id::*;
pub use price::{
    CurrencyCode, CurrencyError, ExchangeRates, MAX_BASE_PRICE, MAX_EXCHANGE_RATE, Price,
    PriceOverflow, SERVICE_SURCHARGE,
};
pub use view::ViewState;
