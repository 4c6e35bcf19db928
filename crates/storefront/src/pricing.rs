//! Display prices for catalog items.

use sukoon_core::{CurrencyCode, ExchangeRates, Price};
use tracing::warn;

use crate::models::Product;

/// Shown instead of an amount that cannot be represented.
pub const PRICE_UNAVAILABLE: &str = "Price unavailable";

/// Price of `product` in `currency`: base price times the rate, plus the
/// flat service surcharge (which is never converted).
///
/// `None` if the result is out of range; the item is still listed.
#[must_use]
pub fn price(product: &Product, currency: CurrencyCode, rates: &ExchangeRates) -> Option<Price> {
    Price::for_display(product.price, currency, rates)
        .inspect_err(|e| warn!(product_id = %product.id, error = %e, "Cannot price product"))
        .ok()
}
