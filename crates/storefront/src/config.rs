//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FIREBASE_API_KEY` - Web API key of the Firebase project
//! - `FIREBASE_PROJECT_ID` - Firebase project ID (Firestore database owner)
//!
//! ## Optional
//! - `FIRESTORE_BASE_URL` - Firestore REST root (default: `https://firestore.googleapis.com/v1`)
//! - `IDENTITY_TOOLKIT_BASE_URL` - Identity Toolkit REST root (default: `https://identitytoolkit.googleapis.com/v1`)
//! - `CLOUDINARY_CLOUD_NAME` / `CLOUDINARY_UPLOAD_PRESET` - Image hosting (both or neither)
//! - `CLOUDINARY_BASE_URL` - Cloudinary API root (default: `https://api.cloudinary.com`)
//! - `GEMINI_API_KEY` - Enables voice transcription
//! - `GEMINI_MODEL` - Model name (default: `gemini-3-flash-preview`)
//! - `GEMINI_BASE_URL` - Generative Language API root (default: `https://generativelanguage.googleapis.com`)
//! - `SHOP_DATA_DIR` - Directory for the local catalog fallback (default: `.sukoon`)
//! - `SHOP_ADMIN_PIN` - Initial admin PIN
//! - `SHOP_ADMIN_RESET_URL` - Initial admin recovery URL
//! - `SHOP_EXCHANGE_RATE_PKR` / `SHOP_EXCHANGE_RATE_AED` - Initial USD exchange rates
//! - `SHOP_TRANSCRIPTION_ENABLED` / `SHOP_GOOGLE_LOGIN_ENABLED` - Initial feature toggles
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

use sukoon_core::MAX_EXCHANGE_RATE;

use crate::settings::{AppSettings, SettingsUpdate};

const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_IDENTITY_TOOLKIT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_CLOUDINARY_BASE_URL: &str = "https://api.cloudinary.com";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_DATA_DIR: &str = ".sukoon";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// Firestore and Identity Toolkit access
    pub firebase: FirebaseConfig,
    /// Image hosting for new products (admin uploads disabled when absent)
    pub cloudinary: Option<CloudinaryConfig>,
    /// Speech-to-text (voice search disabled when absent)
    pub gemini: Option<GeminiConfig>,
    /// Directory holding the local catalog fallback slot
    pub data_dir: PathBuf,
    /// Settings the shop starts with
    pub initial_settings: AppSettings,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Firebase project access.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Web API key, sent as the `key` query parameter
    pub api_key: SecretString,
    /// Project ID
    pub project_id: String,
    /// Firestore REST root, e.g. `https://firestore.googleapis.com/v1`
    pub firestore_base_url: String,
    /// Identity Toolkit REST root
    pub identity_base_url: String,
}

/// Cloudinary unsigned-upload access.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
    pub base_url: String,
}

/// Gemini access for transcription.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: SecretString,
    pub model: String,
    pub base_url: String,
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required keys are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);

        let firebase = FirebaseConfig {
            api_key: SecretString::from(env.required("FIREBASE_API_KEY")?),
            project_id: env.required("FIREBASE_PROJECT_ID")?,
            firestore_base_url: env.or_default("FIRESTORE_BASE_URL", DEFAULT_FIRESTORE_BASE_URL),
            identity_base_url: env
                .or_default("IDENTITY_TOOLKIT_BASE_URL", DEFAULT_IDENTITY_TOOLKIT_BASE_URL),
        };

        let cloudinary = match (
            env.optional("CLOUDINARY_CLOUD_NAME"),
            env.optional("CLOUDINARY_UPLOAD_PRESET"),
        ) {
            (Some(cloud_name), Some(upload_preset)) => Some(CloudinaryConfig {
                cloud_name,
                upload_preset,
                base_url: env.or_default("CLOUDINARY_BASE_URL", DEFAULT_CLOUDINARY_BASE_URL),
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::MissingEnvVar(
                    "CLOUDINARY_UPLOAD_PRESET".to_string(),
                ));
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingEnvVar(
                    "CLOUDINARY_CLOUD_NAME".to_string(),
                ));
            }
        };

        let gemini = env.optional("GEMINI_API_KEY").map(|key| GeminiConfig {
            api_key: SecretString::from(key),
            model: env.or_default("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            base_url: env.or_default("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
        });

        let mut initial_settings = AppSettings::default();
        initial_settings.apply(SettingsUpdate {
            google_login_enabled: env.parsed_bool("SHOP_GOOGLE_LOGIN_ENABLED")?,
            transcription_enabled: env.parsed_bool("SHOP_TRANSCRIPTION_ENABLED")?,
            exchange_rate_pkr: env.parsed_rate("SHOP_EXCHANGE_RATE_PKR")?,
            exchange_rate_aed: env.parsed_rate("SHOP_EXCHANGE_RATE_AED")?,
            admin_pin: env.optional("SHOP_ADMIN_PIN").map(SecretString::from),
            admin_reset_url: env.optional("SHOP_ADMIN_RESET_URL"),
        });

        Ok(Self {
            firebase,
            cloudinary,
            gemini,
            data_dir: PathBuf::from(env.or_default("SHOP_DATA_DIR", DEFAULT_DATA_DIR)),
            initial_settings,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F>(&'a F);

impl<F> Env<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        self.optional(key)
            .map(|v| match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                other => Err(ConfigError::InvalidEnvVar(
                    key.to_string(),
                    format!("expected a boolean, got '{other}'"),
                )),
            })
            .transpose()
    }

    /// Exchange rates must be positive decimals within [`MAX_EXCHANGE_RATE`].
    fn parsed_rate(&self, key: &str) -> Result<Option<Decimal>, ConfigError> {
        self.optional(key)
            .map(|v| {
                let rate = Decimal::from_str(v.trim())
                    .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
                if rate <= Decimal::ZERO {
                    return Err(ConfigError::InvalidEnvVar(
                        key.to_string(),
                        "must be greater than zero".to_string(),
                    ));
                }
                if rate > MAX_EXCHANGE_RATE {
                    return Err(ConfigError::InvalidEnvVar(
                        key.to_string(),
                        format!("must not exceed {MAX_EXCHANGE_RATE}"),
                    ));
                }
                Ok(rate)
            })
            .transpose()
    }
}
