//! Admin panel: inventory management and shop settings.
//!
//! Everything here requires the admin to have passed the PIN gate; an
//! [`Inventory`] can only be opened from an authenticated
//! [`ViewController`].

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument};

use sukoon_core::{MAX_BASE_PRICE, MAX_EXCHANGE_RATE, ProductId};

use crate::catalog::{CatalogError, CatalogGateway};
use crate::controller::ViewController;
use crate::models::{NewProduct, Product};
use crate::services::media::{ImageFile, ImageHost, MediaError};

/// Confirmation shown before a product is deleted.
pub const DELETE_CONFIRMATION: &str = "Are you sure you want to remove this item?";

const SAVE_FAILED: &str = "Failed to save product";

/// Errors from admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Price must be a non-negative number, got '{0}'")]
    InvalidPrice(String),

    #[error("Price cannot exceed {0}")]
    PriceTooHigh(Decimal),

    #[error("Please select an image")]
    MissingImage,

    #[error("{0} exchange rate must be a positive number")]
    InvalidRate(&'static str),

    #[error("{0} exchange rate cannot exceed {1}")]
    RateTooHigh(&'static str, Decimal),

    #[error("image upload failed: {0}")]
    Upload(#[source] MediaError),

    #[error("image uploads are not configured")]
    MediaUnavailable,

    #[error("saving product failed: {0}")]
    Save(#[source] CatalogError),

    #[error("removing product failed: {0}")]
    Remove(#[source] CatalogError),

    #[error("Admin access required.")]
    NotAuthorized,
}

impl AdminError {
    /// Message for the admin form. Provider details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Upload(_) | Self::Save(_) | Self::MediaUnavailable => SAVE_FAILED.to_string(),
            Self::Remove(_) => "Failed to remove product".to_string(),
            Self::InvalidPrice(_) => "Price must be a non-negative number".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether this is a provider or configuration fault rather than bad input.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(
            self,
            Self::Upload(_) | Self::Save(_) | Self::Remove(_) | Self::MediaUnavailable
        )
    }
}

/// The "add product" form as typed by the admin.
#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
    pub name: String,
    pub item_code: String,
    pub destination_url: String,
    pub description: String,
    /// Base price in USD, as typed.
    pub price: String,
    pub image: Option<ImageFile>,
}

/// A draft that passed validation, still waiting for its image URL.
#[derive(Debug)]
pub struct ValidDraft {
    fields: NewProduct,
    image: ImageFile,
}

impl ProductDraft {
    /// Check the form. Nothing is uploaded or saved.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: a blank field, an unparsable or
    /// negative price, or a missing image.
    pub fn validate(self) -> Result<ValidDraft, AdminError> {
        let required = [
            ("Name", &self.name),
            ("Item code", &self.item_code),
            ("Destination URL", &self.destination_url),
            ("Description", &self.description),
            ("Price", &self.price),
        ];
        if let Some(&(field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(AdminError::MissingField(field));
        }

        let price = parse_price(&self.price)?;
        let image = self.image.ok_or(AdminError::MissingImage)?;

        Ok(ValidDraft {
            fields: NewProduct {
                name: self.name.trim().to_string(),
                description: self.description.trim().to_string(),
                item_code: self.item_code.trim().to_string(),
                price,
                image_url: String::new(),
                destination_url: self.destination_url.trim().to_string(),
            },
            image,
        })
    }
}

/// Parse a base price. Must be a non-negative decimal no larger than
/// [`MAX_BASE_PRICE`].
///
/// # Errors
///
/// Returns `AdminError::InvalidPrice` or `AdminError::PriceTooHigh` otherwise.
pub fn parse_price(input: &str) -> Result<Decimal, AdminError> {
    let trimmed = input.trim();
    match Decimal::from_str(trimmed) {
        Ok(price) if price > MAX_BASE_PRICE => Err(AdminError::PriceTooHigh(MAX_BASE_PRICE)),
        Ok(price) if !price.is_sign_negative() => Ok(price),
        _ => Err(AdminError::InvalidPrice(trimmed.to_string())),
    }
}

/// Parse an exchange rate from the settings tab. Must be positive and no
/// larger than [`MAX_EXCHANGE_RATE`].
///
/// # Errors
///
/// Returns `AdminError::InvalidRate` or `AdminError::RateTooHigh` naming the
/// currency otherwise.
pub fn parse_rate(currency: &'static str, input: &str) -> Result<Decimal, AdminError> {
    match Decimal::from_str(input.trim()) {
        Ok(rate) if rate > MAX_EXCHANGE_RATE => {
            Err(AdminError::RateTooHigh(currency, MAX_EXCHANGE_RATE))
        }
        Ok(rate) if rate > Decimal::ZERO => Ok(rate),
        _ => Err(AdminError::InvalidRate(currency)),
    }
}

/// Inventory tab of the admin panel.
pub struct Inventory<'a> {
    catalog: &'a CatalogGateway,
    media: Option<&'a ImageHost>,
}

impl<'a> Inventory<'a> {
    /// Open the inventory for a logged-in admin.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotAuthorized` if the admin has not passed the PIN gate.
    pub const fn open(
        controller: &ViewController,
        catalog: &'a CatalogGateway,
        media: Option<&'a ImageHost>,
    ) -> Result<Self, AdminError> {
        if !controller.is_admin_authenticated() {
            return Err(AdminError::NotAuthorized);
        }
        Ok(Self { catalog, media })
    }

    /// Active items, newest first.
    pub async fn products(&self) -> Vec<Product> {
        self.catalog.list_products().await
    }

    /// Validate the draft, upload its image, then save the product.
    ///
    /// # Errors
    ///
    /// Validation errors leave everything untouched. An upload failure aborts
    /// before anything is saved.
    #[instrument(skip(self, draft), fields(item_code = %draft.item_code))]
    pub async fn publish(&self, draft: ProductDraft) -> Result<(), AdminError> {
        let ValidDraft { mut fields, image } = draft.validate()?;
        let media = self.media.ok_or(AdminError::MediaUnavailable)?;

        fields.image_url = media.upload(image).await.map_err(AdminError::Upload)?;
        self.catalog
            .create_product(fields)
            .await
            .map_err(AdminError::Save)?;

        info!("Product published");
        Ok(())
    }

    /// Delete a product after `confirm` agrees to [`DELETE_CONFIRMATION`],
    /// dropping it from `displayed` as well. Returns whether it was deleted.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Remove` if both catalog backends failed.
    #[instrument(skip(self, confirm, displayed))]
    pub async fn remove(
        &self,
        id: &ProductId,
        confirm: impl FnOnce(&str) -> bool + Send,
        displayed: &mut Vec<Product>,
    ) -> Result<bool, AdminError> {
        if !confirm(DELETE_CONFIRMATION) {
            return Ok(false);
        }
        self.catalog
            .delete_product(id)
            .await
            .map_err(AdminError::Remove)?;
        displayed.retain(|p| &p.id != id);
        info!("Product removed");
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use sukoon_core::ViewState;

    use super::*;
    use crate::catalog::tests::{FakeBackend, sample};
    use crate::settings::DEFAULT_ADMIN_PIN;

    fn image() -> ImageFile {
        ImageFile {
            file_name: "oud.jpg".to_string(),
            mime_type: "image/jpeg",
            bytes: vec![0xFF, 0xD8],
        }
    }

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Oud".into(),
            item_code: "SKN-002".into(),
            destination_url: "https://pay.example/oud".into(),
            description: "Attar".into(),
            price: "19.99".into(),
            image: Some(image()),
        }
    }

    fn admin() -> ViewController {
        let mut vc = ViewController::default();
        vc.navigate(ViewState::Admin);
        vc.submit_admin_pin(DEFAULT_ADMIN_PIN).unwrap();
        vc
    }

    fn catalog() -> (CatalogGateway, Arc<FakeBackend>) {
        let remote = Arc::new(FakeBackend::default());
        (
            CatalogGateway::new(remote.clone(), Arc::new(FakeBackend::default())),
            remote,
        )
    }

    #[test]
    fn test_valid_draft() {
        let valid = draft().validate().unwrap();
        assert_eq!(valid.fields.price, Decimal::new(1999, 2));
        assert_eq!(valid.fields.item_code, "SKN-002");
        assert!(valid.fields.image_url.is_empty());
    }

    #[test]
    fn test_blank_fields_block_submission() {
        let mut d = draft();
        d.item_code = "  ".into();
        assert!(matches!(d.validate(), Err(AdminError::MissingField("Item code"))));
    }

    #[test]
    fn test_bad_prices() {
        for bad in ["abc", "-1", "1.2.3"] {
            let mut d = draft();
            d.price = bad.into();
            let err = d.validate().unwrap_err();
            assert!(matches!(err, AdminError::InvalidPrice(_)), "{bad}");
            assert_eq!(err.user_message(), "Price must be a non-negative number");
        }
        assert_eq!(parse_price("0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_price_cap() {
        assert_eq!(parse_price("1000000000000").unwrap(), MAX_BASE_PRICE);

        let mut d = draft();
        d.price = "1000000000000000000000000000".into();
        let err = d.validate().unwrap_err();
        assert!(matches!(err, AdminError::PriceTooHigh(_)));
        assert_eq!(err.user_message(), "Price cannot exceed 1000000000000");
        assert!(!err.is_fault());
    }

    #[test]
    fn test_missing_image() {
        let mut d = draft();
        d.image = None;
        let err = d.validate().unwrap_err();
        assert_eq!(err.user_message(), "Please select an image");
        assert!(!err.is_fault());
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate("PKR", " 281.5 ").unwrap(), Decimal::new(2815, 1));
        assert!(matches!(parse_rate("AED", "0"), Err(AdminError::InvalidRate("AED"))));
        assert!(parse_rate("AED", "x").is_err());

        assert_eq!(parse_rate("PKR", "1000000").unwrap(), MAX_EXCHANGE_RATE);
        let err = parse_rate("PKR", "100000000000000000000").unwrap_err();
        assert!(matches!(err, AdminError::RateTooHigh("PKR", _)));
        assert_eq!(err.to_string(), "PKR exchange rate cannot exceed 1000000");
    }

    #[test]
    fn test_inventory_needs_admin() {
        let (catalog, _) = catalog();
        let vc = ViewController::default();
        assert!(matches!(
            Inventory::open(&vc, &catalog, None),
            Err(AdminError::NotAuthorized)
        ));
    }

    #[tokio::test]
    async fn test_publish_without_image_host_saves_nothing() {
        let (catalog, remote) = catalog();
        let vc = admin();
        let inventory = Inventory::open(&vc, &catalog, None).unwrap();

        let err = inventory.publish(draft()).await.unwrap_err();
        assert_eq!(err.user_message(), "Failed to save product");
        assert!(remote.products.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_draft_saves_nothing() {
        let (catalog, remote) = catalog();
        let vc = admin();
        let inventory = Inventory::open(&vc, &catalog, None).unwrap();

        let mut d = draft();
        d.price = "free".into();
        assert!(inventory.publish(d).await.is_err());
        assert!(remote.products.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_requires_confirmation() {
        let (catalog, remote) = catalog();
        catalog.create_product(sample("a")).await.unwrap();
        let vc = admin();
        let inventory = Inventory::open(&vc, &catalog, None).unwrap();

        let mut displayed = inventory.products().await;
        let id = displayed[0].id.clone();

        let mut question = String::new();
        let removed = inventory
            .remove(
                &id,
                |q| {
                    question = q.to_string();
                    false
                },
                &mut displayed,
            )
            .await
            .unwrap();
        assert!(!removed);
        assert_eq!(question, DELETE_CONFIRMATION);
        assert_eq!(displayed.len(), 1);

        assert!(inventory.remove(&id, |_| true, &mut displayed).await.unwrap());
        assert!(displayed.is_empty());
        assert!(remote.products.lock().unwrap().is_empty());
    }
}
