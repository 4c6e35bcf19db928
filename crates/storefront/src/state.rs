//! Provider clients shared by every screen.

use std::sync::Arc;

use crate::catalog::{CatalogError, CatalogGateway};
use crate::config::ShopConfig;
use crate::services::auth::{AuthError, AuthGateway};
use crate::services::media::{ImageHost, MediaError};
use crate::services::transcription::{TranscriptionError, Transcriber};

/// Error constructing the provider clients.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("HTTP client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("identity provider: {0}")]
    Auth(#[from] AuthError),
    #[error("image host: {0}")]
    Media(#[from] MediaError),
    #[error("transcription: {0}")]
    Transcription(#[from] TranscriptionError),
}

/// Configuration and provider clients.
///
/// This struct is cheaply cloneable via `Arc`; all clients share one HTTP
/// connection pool.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ShopConfig,
    catalog: CatalogGateway,
    auth: AuthGateway,
    media: Option<ImageHost>,
    transcriber: Option<Transcriber>,
}

impl AppState {
    /// Build every client from configuration.
    ///
    /// Image uploads and transcription are left out when their providers are
    /// not configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or a provider URL
    /// is invalid.
    pub fn new(config: ShopConfig) -> Result<Self, StateError> {
        let http = http_client()?;
        let catalog = CatalogGateway::from_config(&config, http.clone())?;
        Self::with_catalog(config, catalog, http)
    }

    /// Build the provider clients around an existing catalog.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new), minus the catalog.
    pub fn with_catalog(
        config: ShopConfig,
        catalog: CatalogGateway,
        http: reqwest::Client,
    ) -> Result<Self, StateError> {
        let auth = AuthGateway::new(&config.firebase, http.clone())?;
        let media = config
            .cloudinary
            .as_ref()
            .map(|c| ImageHost::new(c, http.clone()))
            .transpose()?;
        let transcriber = config
            .gemini
            .as_ref()
            .map(|g| Transcriber::new(g, http.clone()))
            .transpose()?;

        tracing::debug!(
            image_uploads = media.is_some(),
            transcription = transcriber.is_some(),
            "Provider clients ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                auth,
                media,
                transcriber,
            }),
        })
    }

    /// Get a reference to the shop configuration.
    #[must_use]
    pub fn config(&self) -> &ShopConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogGateway {
        &self.inner.catalog
    }

    #[must_use]
    pub fn auth(&self) -> &AuthGateway {
        &self.inner.auth
    }

    /// Image host, if Cloudinary is configured.
    #[must_use]
    pub fn media(&self) -> Option<&ImageHost> {
        self.inner.media.as_ref()
    }

    /// Transcriber, if Gemini is configured.
    #[must_use]
    pub fn transcriber(&self) -> Option<&Transcriber> {
        self.inner.transcriber.as_ref()
    }
}

/// Shared HTTP client for all providers.
///
/// # Errors
///
/// Returns `reqwest::Error` if the TLS backend cannot be initialized.
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(concat!("sukoon-storefront/", env!("CARGO_PKG_VERSION")))
        .build()
}
