//! Clients for the storefront's external providers.
//!
//! # Services
//!
//! - `auth` - Customer accounts (Identity Toolkit)
//! - `media` - Product image uploads (Cloudinary)
//! - `transcription` - Voice-to-text (Gemini)

pub mod auth;
pub mod media;
pub mod transcription;

pub use auth::{AuthError, AuthGateway, AuthState, UserSession};
pub use media::{ImageFile, ImageHost, MediaError};
pub use transcription::{AudioClip, Transcriber};
