//! Inventory management commands.
//!
//! # Usage
//!
//! ```bash
//! # Publish a product; the image is uploaded first
//! sukoon admin --pin "$PIN" add --name Oud --item-code SKN-002 \
//!     --description "Attar" --price 19.99 \
//!     --destination-url https://pay.example/oud --image oud.jpg
//!
//! # Delete a product
//! sukoon admin --pin "$PIN" delete 7Xq2kLm9
//! ```
//!
//! # Environment Variables
//!
//! - `SHOP_ADMIN_PIN` - PIN the shop starts with
//! - `CLOUDINARY_CLOUD_NAME` / `CLOUDINARY_UPLOAD_PRESET` - Required to add products

use std::path::PathBuf;

use clap::Args;
use dialoguer::Password;

use sukoon_core::{ProductId, ViewState};
use sukoon_storefront::Storefront;
use sukoon_storefront::admin::ProductDraft;
use sukoon_storefront::services::media::ImageFile;

use super::{CliError, confirm};

/// Fields of a new product.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Stock-keeping code shown on the card
    #[arg(long)]
    pub item_code: String,

    /// Checkout link opened by Buy Now
    #[arg(long)]
    pub destination_url: String,

    #[arg(long)]
    pub description: String,

    /// Base price in USD
    #[arg(long)]
    pub price: String,

    /// Product image to upload
    #[arg(long)]
    pub image: PathBuf,
}

impl AddArgs {
    /// Read the image and build the form.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Image` if the image cannot be read.
    pub async fn into_draft(self) -> Result<ProductDraft, CliError> {
        let image = ImageFile::from_path(&self.image).await?;
        Ok(ProductDraft {
            name: self.name,
            item_code: self.item_code,
            destination_url: self.destination_url,
            description: self.description,
            price: self.price,
            image: Some(image),
        })
    }
}

/// Pass the admin PIN gate, prompting for the PIN if not given.
///
/// # Errors
///
/// Returns an error if the PIN is wrong or cannot be read.
#[allow(clippy::print_stdout)]
pub async fn login(shop: &mut Storefront, pin: Option<String>) -> Result<(), CliError> {
    if shop.navigate(ViewState::Admin).await == ViewState::Admin {
        return Ok(());
    }

    let pin = match pin {
        Some(pin) => pin,
        None => Password::new().with_prompt("Access PIN").interact()?,
    };

    if let Err(e) = shop.submit_admin_pin(&pin).await {
        println!(
            "Forgot your PIN? Recover access at {}",
            shop.controller().settings().admin_reset_url
        );
        return Err(e.into());
    }
    Ok(())
}

/// Publish a product.
///
/// # Errors
///
/// Returns an error if the form is invalid, the upload fails or the product
/// cannot be saved.
#[allow(clippy::print_stdout)]
pub async fn add(shop: &mut Storefront, args: AddArgs) -> Result<(), CliError> {
    let draft = args.into_draft().await?;
    shop.publish_product(draft).await?;
    println!("Product published");
    Ok(())
}

/// Delete a product, asking first unless `yes` is set.
///
/// # Errors
///
/// Returns an error if neither catalog store could delete it.
#[allow(clippy::print_stdout)]
pub async fn delete(shop: &mut Storefront, id: &ProductId, yes: bool) -> Result<(), CliError> {
    let removed = shop.remove_product(id, |q| yes || confirm(q)).await?;
    if removed {
        println!("Removed {id}");
    } else {
        println!("Kept {id}");
    }
    Ok(())
}
