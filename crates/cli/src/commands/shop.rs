//! Shop screen commands.
//!
//! # Usage
//!
//! ```bash
//! sukoon products
//! sukoon --currency AED buy 7Xq2kLm9
//! ```

use sukoon_core::ProductId;
use sukoon_storefront::Storefront;
use sukoon_storefront::shop::{EMPTY_CATALOG_MESSAGE, SupportStatus, support_links};

use super::CliError;

/// Reload and print the product grid.
pub async fn list(shop: &mut Storefront) {
    shop.refresh().await;
    print_page(shop);
}

/// Print the checkout link for a product.
///
/// # Errors
///
/// Returns an error for an unknown product or one with no checkout link.
#[allow(clippy::print_stdout)]
pub async fn buy(shop: &mut Storefront, id: &ProductId) -> Result<(), CliError> {
    shop.refresh().await;
    let url = shop.buy_now(id)?;
    println!("{url}");
    Ok(())
}

/// Print the shop screen as last loaded.
#[allow(clippy::print_stdout)]
pub fn print_page(shop: &Storefront) {
    let page = shop.shop_page();

    if page.is_empty() {
        println!("{EMPTY_CATALOG_MESSAGE}");
    }
    for card in &page.cards {
        println!("{}  [{}]  {}", card.name, card.item_code, card.price_label());
        if !card.description.is_empty() {
            println!("    {}", card.description);
        }
        println!("    id: {}", card.id);
    }

    println!();
    println!("{}", SupportStatus::today().label());
    for link in support_links() {
        println!("  {}  <{}>", link.label, link.href);
    }
}
