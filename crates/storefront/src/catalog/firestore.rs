//! Firestore REST backend for the `products` collection.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};
use url::Url;

use sukoon_core::ProductId;

use super::document::{
    Document, PRODUCTS_COLLECTION, RunQueryItem, RunQueryRequest, decode_product, encode_product,
};
use super::{CatalogBackend, CatalogError};
use crate::config::FirebaseConfig;
use crate::models::{NewProduct, Product};

/// Client for the Firestore `products` collection.
#[derive(Clone)]
pub struct FirestoreCatalog {
    inner: Arc<FirestoreCatalogInner>,
}

struct FirestoreCatalogInner {
    client: reqwest::Client,
    /// `{base}/projects/{project}/databases/(default)`
    database: Url,
    api_key: SecretString,
}

impl FirestoreCatalog {
    /// Create a new Firestore catalog client.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Endpoint` if the configured base URL is not an
    /// absolute http(s) URL.
    pub fn new(config: &FirebaseConfig, client: reqwest::Client) -> Result<Self, CatalogError> {
        let mut database = Url::parse(&config.firestore_base_url)?;
        database
            .path_segments_mut()
            .map_err(|()| {
                CatalogError::Endpoint(url::ParseError::RelativeUrlWithCannotBeABaseBase)
            })?
            .pop_if_empty()
            .extend(["projects", config.project_id.as_str(), "databases", "(default)"]);

        Ok(Self {
            inner: Arc::new(FirestoreCatalogInner {
                client,
                database,
                api_key: config.api_key.clone(),
            }),
        })
    }

    /// Build a keyed endpoint below the database root.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.database.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url.query_pairs_mut()
            .append_pair("key", self.inner.api_key.expose_secret());
        url
    }

    /// Fail on non-success status, keeping the head of the body for logs.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, CatalogError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(CatalogError::Status {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        })
    }
}

#[async_trait]
impl CatalogBackend for FirestoreCatalog {
    fn name(&self) -> &'static str {
        "firestore"
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(&["documents:runQuery"]))
            .json(&RunQueryRequest::newest_products())
            .send()
            .await?;
        let items: Vec<RunQueryItem> = Self::check(response).await?.json().await?;

        let products = decode_page(&items);
        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    #[instrument(skip(self, product), fields(item_code = %product.item_code))]
    async fn insert(
        &self,
        product: &NewProduct,
        created_at: i64,
    ) -> Result<ProductId, CatalogError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(&["documents", PRODUCTS_COLLECTION]))
            .json(&encode_product(product, created_at))
            .send()
            .await?;
        let stored: Document = Self::check(response).await?.json().await?;

        decode_product(&stored).map(|p| p.id)
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: &ProductId) -> Result<(), CatalogError> {
        let response = self
            .inner
            .client
            .delete(self.endpoint(&["documents", PRODUCTS_COLLECTION, id.as_str()]))
            .send()
            .await?;

        // Firestore answers 200 for documents that never existed.
        Self::check(response).await.map(|_| ())
    }
}

/// Decode every document in a `runQuery` page, skipping ones that do not
/// decode so a single bad record cannot hide the rest of the catalog.
fn decode_page(items: &[RunQueryItem]) -> Vec<Product> {
    items
        .iter()
        .filter_map(|item| item.document.as_ref())
        .filter_map(|document| {
            decode_product(document)
                .inspect_err(|e| warn!(document = %document.name, error = %e, "Skipping product"))
                .ok()
        })
        .collect()
}
