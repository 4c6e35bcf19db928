//! Product catalog with a remote store and a local fallback.
//!
//! # Architecture
//!
//! - [`CatalogBackend`] is the storage strategy: [`FirestoreCatalog`] talks to
//!   the Firestore `products` collection, [`LocalCatalog`] keeps the whole list
//!   in one JSON slot on disk.
//! - [`CatalogGateway`] always tries the remote backend first and degrades to
//!   the local one on any fault. Callers never learn which one served them.
//! - Nothing is reconciled. A product created while offline lives only in the
//!   local slot; a product created online lives only in Firestore. IDs from one
//!   backend mean nothing to the other.
//!
//! # Example
//!
//! ```rust,ignore
//! let catalog = CatalogGateway::from_config(&config, http.clone())?;
//!
//! catalog.create_product(new_product).await?;
//! let products = catalog.list_products().await; // newest first
//! ```

mod document;
mod firestore;
mod local;

pub use firestore::FirestoreCatalog;
pub use local::{LOCAL_SLOT_NAME, LocalCatalog};

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, instrument, warn};

use sukoon_core::ProductId;

use crate::config::ShopConfig;
use crate::models::{NewProduct, Product};

/// Errors that can occur inside a catalog backend.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote store answered with a non-success status.
    #[error("remote store returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// First part of the response body.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Reading or writing the local slot failed.
    #[error("local storage error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored document could not be mapped to a product.
    #[error("malformed document: {0}")]
    Malformed(String),

    /// The backend endpoint is misconfigured.
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// Backend refused the operation for another reason.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// A place products can be stored.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// All products, newest first.
    async fn list(&self) -> Result<Vec<Product>, CatalogError>;

    /// Store a product stamped with `created_at`, returning its new ID.
    async fn insert(&self, product: &NewProduct, created_at: i64)
    -> Result<ProductId, CatalogError>;

    /// Delete a product. Unknown IDs are not an error.
    async fn remove(&self, id: &ProductId) -> Result<(), CatalogError>;
}

/// Remote-first catalog with silent local fallback.
#[derive(Clone)]
pub struct CatalogGateway {
    remote: Arc<dyn CatalogBackend>,
    local: Arc<dyn CatalogBackend>,
}

impl CatalogGateway {
    /// Create a gateway over two backends.
    #[must_use]
    pub fn new(remote: Arc<dyn CatalogBackend>, local: Arc<dyn CatalogBackend>) -> Self {
        Self { remote, local }
    }

    /// Build the standard Firestore + local slot pair from configuration.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Endpoint` if the Firestore base URL is invalid.
    pub fn from_config(config: &ShopConfig, http: reqwest::Client) -> Result<Self, CatalogError> {
        let remote = FirestoreCatalog::new(&config.firebase, http)?;
        let local = LocalCatalog::new(config.data_dir.join(LOCAL_SLOT_NAME));
        Ok(Self::new(Arc::new(remote), Arc::new(local)))
    }

    /// List products, newest first.
    ///
    /// Never fails: a remote fault falls back to the local slot, and an absent
    /// or unreadable slot yields an empty catalog.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Vec<Product> {
        match self.remote.list().await {
            Ok(products) => products,
            Err(e) => {
                warn!(
                    backend = self.remote.name(),
                    error = %e,
                    "Remote catalog unavailable, reading local fallback"
                );
                self.local.list().await.unwrap_or_else(|e| {
                    error!(backend = self.local.name(), error = %e, "Local catalog unreadable");
                    Vec::new()
                })
            }
        }
    }

    /// Create a product, stamping the current time.
    ///
    /// # Errors
    ///
    /// Returns the local backend's error only if the remote insert failed and
    /// the local fallback failed as well.
    #[instrument(skip(self, product), fields(item_code = %product.item_code))]
    pub async fn create_product(&self, product: NewProduct) -> Result<(), CatalogError> {
        let created_at = chrono::Utc::now().timestamp_millis();

        match self.remote.insert(&product, created_at).await {
            Ok(id) => {
                tracing::info!(backend = self.remote.name(), %id, "Product created");
                Ok(())
            }
            Err(e) => {
                warn!(
                    backend = self.remote.name(),
                    error = %e,
                    "Remote insert failed, saving to local fallback"
                );
                let id = self.local.insert(&product, created_at).await.inspect_err(|e| {
                    error!(backend = self.local.name(), error = %e, "Local insert failed");
                })?;
                tracing::info!(backend = self.local.name(), %id, "Product created");
                Ok(())
            }
        }
    }

    /// Delete a product by ID.
    ///
    /// An ID unknown to the backend that handles the call is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the local backend's error only if both backends failed.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), CatalogError> {
        if let Err(e) = self.remote.remove(id).await {
            warn!(
                backend = self.remote.name(),
                error = %e,
                "Remote delete failed, deleting from local fallback"
            );
            self.local.remove(id).await.inspect_err(|e| {
                error!(backend = self.local.name(), error = %e, "Local delete failed");
            })?;
        }
        Ok(())
    }
}
