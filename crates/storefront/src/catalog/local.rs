//! Single-file JSON fallback catalog.
//!
//! The whole product list lives in one slot and is rewritten wholesale on
//! every change. Writes go through a temporary sibling file and a rename so a
//! crash never leaves a half-written slot behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};

use sukoon_core::ProductId;

use super::{CatalogBackend, CatalogError};
use crate::models::{NewProduct, Product};

/// File name of the fallback slot inside the data directory.
pub const LOCAL_SLOT_NAME: &str = "quick_shop_products.json";

/// Fallback catalog stored in a local JSON file.
pub struct LocalCatalog {
    path: PathBuf,
}

impl LocalCatalog {
    /// Create a catalog backed by the file at `path`. The file need not exist.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the slot.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<Product>, CatalogError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, products: &[Product]) -> Result<(), CatalogError> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(dir).await?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, serde_json::to_vec_pretty(products)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Pick an ID from the creation stamp, stepping forward past any collision.
fn unique_id(products: &[Product], created_at: i64) -> ProductId {
    let mut candidate = created_at;
    loop {
        let id = candidate.to_string();
        if !products.iter().any(|p| p.id.as_str() == id) {
            return ProductId::new(id);
        }
        candidate += 1;
    }
}

#[async_trait]
impl CatalogBackend for LocalCatalog {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        self.load().await
    }

    #[instrument(skip(self, product), fields(path = %self.path.display()))]
    async fn insert(
        &self,
        product: &NewProduct,
        created_at: i64,
    ) -> Result<ProductId, CatalogError> {
        let mut products = self.load().await?;
        let id = unique_id(&products, created_at);
        products.insert(0, product.clone().into_product(id.clone(), created_at));
        self.store(&products).await?;

        debug!(%id, count = products.len(), "Saved product to local slot");
        Ok(id)
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn remove(&self, id: &ProductId) -> Result<(), CatalogError> {
        let mut products = self.load().await?;
        let before = products.len();
        products.retain(|p| &p.id != id);
        if products.len() == before {
            debug!(%id, "Product not in local slot");
            return Ok(());
        }
        self.store(&products).await
    }
}
