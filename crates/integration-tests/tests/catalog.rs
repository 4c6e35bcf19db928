//! Catalog listing and local fallback against the fake Firestore.
//!
//! Run with: cargo test -p sukoon-integration-tests --test catalog

use rust_decimal::Decimal;
use serde_json::json;
use tempfile::TempDir;

use sukoon_core::{CurrencyCode, ProductId, ViewState};
use sukoon_integration_tests::FakeProviders;
use sukoon_storefront::catalog::LOCAL_SLOT_NAME;
use sukoon_storefront::models::NewProduct;
use sukoon_storefront::settings::DEFAULT_ADMIN_PIN;
use sukoon_storefront::shop::EMPTY_CATALOG_MESSAGE;
use sukoon_storefront::{AppState, Storefront};

async fn setup() -> (FakeProviders, TempDir, Storefront) {
    let providers = FakeProviders::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let state =
        AppState::new(providers.config(dir.path(), &[])).expect("Failed to build app state");
    (providers, dir, Storefront::new(state))
}

fn new_product(name: &str) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: "Hand-poured".to_string(),
        item_code: format!("SKN-{name}"),
        price: Decimal::new(1250, 2),
        image_url: format!("https://img.example/{name}.jpg"),
        destination_url: format!("https://pay.example/{name}"),
    }
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_lists_newest_first_with_prices() {
    let (providers, _dir, mut shop) = setup().await;
    providers.seed_product("old", "Amber", json!({"integerValue": "15"}), 1_000);
    providers.seed_product("new", "Musk", json!({"doubleValue": 12.5}), 2_000);

    shop.refresh().await;
    let names: Vec<&str> = shop.products().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Musk", "Amber"]);
    assert_eq!(shop.products()[1].price, Decimal::from(15));
    assert_eq!(shop.products()[0].price, Decimal::new(125, 1));
    assert_eq!(shop.products()[0].created_at, Some(2_000));

    let page = shop.shop_page();
    assert_eq!(page.cards[1].price_label(), "Rs. 4,320");

    shop.set_currency(CurrencyCode::USD);
    assert_eq!(shop.shop_page().cards[1].price_label(), "$ 135.00");

    shop.set_currency(CurrencyCode::AED);
    assert_eq!(shop.shop_page().cards[1].price_label(), "AED 175.05");
}

#[tokio::test]
async fn test_empty_catalog() {
    let (_providers, _dir, mut shop) = setup().await;
    shop.refresh().await;
    assert!(shop.products().is_empty());
    assert!(shop.shop_page().is_empty());
    assert_eq!(EMPTY_CATALOG_MESSAGE, "No items currently available.");
}

#[tokio::test]
async fn test_buy_now_redirects_to_destination() {
    let (providers, _dir, mut shop) = setup().await;
    providers.seed_product("a1", "Oud", json!({"integerValue": "20"}), 1);
    shop.refresh().await;

    assert_eq!(
        shop.buy_now(&ProductId::new("a1")).expect("Buy now failed"),
        "https://pay.example/a1"
    );
}

#[tokio::test]
async fn test_out_of_range_price_renders_without_panicking() {
    let (providers, _dir, mut shop) = setup().await;
    providers.seed_product("huge", "Heirloom", json!({"doubleValue": 1e28}), 2);
    providers.seed_product("a1", "Oud", json!({"integerValue": "20"}), 1);
    shop.refresh().await;

    let page = shop.shop_page();
    assert_eq!(page.cards.len(), 2);
    assert_eq!(page.cards[0].price_label(), "Price unavailable");
    assert_eq!(page.cards[1].price_label(), "Rs. 5,720");
    assert_eq!(
        shop.buy_now(&ProductId::new("huge")).expect("Buy now failed"),
        "https://pay.example/huge"
    );
}

// ============================================================================
// Writes
// ============================================================================

#[tokio::test]
async fn test_create_and_delete_through_firestore() {
    let (providers, dir, shop) = setup().await;
    let catalog = shop.state().catalog();

    catalog
        .create_product(new_product("rose"))
        .await
        .expect("Create failed");

    let stored = providers.stored_products();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].string("itemCode"), "SKN-rose");
    assert_eq!(stored[0].fields["price"], json!({"doubleValue": 12.5}));
    assert!(stored[0].fields["createdAt"]["integerValue"].is_string());
    assert!(!dir.path().join(LOCAL_SLOT_NAME).exists());

    let listed = catalog.list_products().await;
    assert_eq!(listed[0].id, ProductId::new(stored[0].id.clone()));

    catalog.delete_product(&listed[0].id).await.expect("Delete failed");
    assert!(providers.stored_products().is_empty());

    // Unknown IDs are a no-op.
    catalog
        .delete_product(&ProductId::new("never-existed"))
        .await
        .expect("Deleting an unknown id should succeed");
}

// ============================================================================
// Fallback
// ============================================================================

#[tokio::test]
async fn test_local_fallback_while_firestore_is_down() {
    let (providers, dir, mut shop) = setup().await;
    providers.seed_product("remote", "Remote only", json!({"integerValue": "5"}), 1);
    providers.set_firestore_down(true);

    // Writes land in the local slot.
    let catalog = shop.state().catalog().clone();
    catalog
        .create_product(new_product("first"))
        .await
        .expect("Fallback create failed");
    catalog
        .create_product(new_product("second"))
        .await
        .expect("Fallback create failed");
    assert!(dir.path().join(LOCAL_SLOT_NAME).exists());
    assert_eq!(providers.stored_products().len(), 1);

    // Reads come from the local slot, newest first.
    shop.refresh().await;
    let names: Vec<&str> = shop.products().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["second", "first"]);

    // Deletes hit the local slot as well.
    shop.navigate(ViewState::Admin).await;
    shop.submit_admin_pin(DEFAULT_ADMIN_PIN)
        .await
        .expect("PIN rejected");
    let id = shop.products()[0].id.clone();
    assert!(shop.remove_product(&id, |_| true).await.expect("Delete failed"));
    shop.refresh().await;
    assert_eq!(shop.products().len(), 1);
    assert_eq!(shop.products()[0].name, "first");

    // Once Firestore is back, only remote items show; nothing is reconciled.
    providers.set_firestore_down(false);
    shop.refresh().await;
    let names: Vec<&str> = shop.products().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Remote only"]);
    assert_eq!(providers.stored_products().len(), 1);
}

#[tokio::test]
async fn test_malformed_document_does_not_trigger_fallback() {
    let (providers, _dir, mut shop) = setup().await;

    // Something in the local slot that must stay hidden while Firestore answers.
    providers.set_firestore_down(true);
    shop.state()
        .catalog()
        .create_product(new_product("offline"))
        .await
        .expect("Fallback create failed");
    providers.set_firestore_down(false);

    providers.seed_product("good", "Amber", json!({"integerValue": "15"}), 1);
    providers.seed_product("bad", "Broken", json!({"doubleValue": 1e300}), 2);

    shop.refresh().await;
    let names: Vec<&str> = shop.products().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Amber"]);
    assert_eq!(shop.shop_page().cards[0].price_label(), "Rs. 4,320");
}

#[tokio::test]
async fn test_down_with_no_local_slot_lists_nothing() {
    let (providers, dir, mut shop) = setup().await;
    providers.set_firestore_down(true);

    shop.refresh().await;
    assert!(shop.products().is_empty());
    assert!(!dir.path().join(LOCAL_SLOT_NAME).exists());
}
