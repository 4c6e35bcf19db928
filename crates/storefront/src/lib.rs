//! Sukoon Storefront library.
//!
//! Client-side logic for the Sukoon Shop storefront. There is no server of
//! our own: the catalog and customer accounts live in Firebase, product images
//! in Cloudinary, and voice search goes to Gemini. This crate wraps those
//! providers and holds the storefront's view logic so any front end (the CLI
//! today) can drive it.
//!
//! # Modules
//!
//! - [`catalog`] - Product catalog with remote store and local fallback
//! - [`pricing`] - Display price calculation
//! - [`controller`] - Screen state machine with the admin PIN gate
//! - [`services`] - Identity provider, image host and transcription clients
//! - [`shop`], [`admin`], [`account`] - Per-screen flows
//! - [`app`] - [`app::Storefront`], tying state, controller and catalog together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod admin;
pub mod app;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod pricing;
pub mod services;
pub mod settings;
pub mod shop;
pub mod state;

pub use app::Storefront;
pub use config::ShopConfig;
pub use error::{AppError, Result};
pub use state::AppState;
