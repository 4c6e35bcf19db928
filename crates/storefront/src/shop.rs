//! Customer-facing shop screen.

use chrono::{Datelike, Weekday};
use thiserror::Error;

use sukoon_core::{CurrencyCode, ExchangeRates, Price, ProductId};

use crate::controller::ViewController;
use crate::models::Product;
use crate::pricing::{PRICE_UNAVAILABLE, price};

/// Shown in place of the grid when the catalog is empty.
pub const EMPTY_CATALOG_MESSAGE: &str = "No items currently available.";

/// Support mailbox.
pub const SUPPORT_EMAIL: &str = "sukoonbase@hotmail.com";

/// Support Snapchat handle.
pub const SUPPORT_SNAPCHAT: &str = "sukoonbase0786";

/// Buy Now on an item without a checkout target.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Redirect location not configured for this item.")]
    NotConfigured,
}

/// One product as rendered in the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub item_code: String,
    pub description: String,
    pub image_url: String,
    /// `None` when the amount is out of range.
    pub price: Option<Price>,
    destination_url: String,
}

impl ProductCard {
    #[must_use]
    pub fn new(product: &Product, currency: CurrencyCode, rates: &ExchangeRates) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            item_code: product.item_code.clone(),
            description: product.description.clone(),
            image_url: product.image_url.clone(),
            price: price(product, currency, rates),
            destination_url: product.destination_url.clone(),
        }
    }

    /// e.g. `Rs. 4,320`
    #[must_use]
    pub fn price_label(&self) -> String {
        self.price
            .as_ref()
            .map_or_else(|| PRICE_UNAVAILABLE.to_string(), Price::label)
    }

    /// Checkout URL to open for this item.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotConfigured` if the item has no destination.
    pub fn buy_now(&self) -> Result<&str, CheckoutError> {
        let url = self.destination_url.trim();
        if url.is_empty() {
            Err(CheckoutError::NotConfigured)
        } else {
            Ok(url)
        }
    }
}

/// The shop screen for the current currency and settings.
#[derive(Debug, Clone)]
pub struct ShopPage {
    pub currency: CurrencyCode,
    pub cards: Vec<ProductCard>,
    /// Whether the voice transcription panel is shown.
    pub transcription_enabled: bool,
}

impl ShopPage {
    /// Price every product for the controller's currency and rates.
    #[must_use]
    pub fn build(products: &[Product], controller: &ViewController) -> Self {
        let currency = controller.currency();
        let rates = controller.exchange_rates();
        Self {
            currency,
            cards: products
                .iter()
                .map(|p| ProductCard::new(p, currency, &rates))
                .collect(),
            transcription_enabled: controller.settings().transcription_enabled,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn card(&self, id: &ProductId) -> Option<&ProductCard> {
        self.cards.iter().find(|c| &c.id == id)
    }
}

/// A footer contact link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportLink {
    pub label: String,
    pub href: String,
}

/// Contact links shown in the footer.
#[must_use]
pub fn support_links() -> [SupportLink; 2] {
    [
        SupportLink {
            label: SUPPORT_EMAIL.to_string(),
            href: format!("mailto:{SUPPORT_EMAIL}"),
        },
        SupportLink {
            label: format!("Snapchat: {SUPPORT_SNAPCHAT}"),
            href: format!("https://snapchat.com/add/{SUPPORT_SNAPCHAT}"),
        },
    ]
}

/// Whether live support is staffed. Online Monday to Thursday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportStatus {
    Online,
    Offline,
}

impl SupportStatus {
    #[must_use]
    pub const fn for_weekday(day: Weekday) -> Self {
        match day {
            Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu => Self::Online,
            Weekday::Fri | Weekday::Sat | Weekday::Sun => Self::Offline,
        }
    }

    /// Status for today in local time.
    #[must_use]
    pub fn today() -> Self {
        Self::for_weekday(chrono::Local::now().weekday())
    }

    /// e.g. `Support Status: Online (Mon-Thu)`
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Online => "Support Status: Online (Mon-Thu)",
            Self::Offline => "Support Status: Offline (Fri-Sun)",
        }
    }
}
