//! Admin publishing flow against the fake Cloudinary and Firestore.
//!
//! Run with: cargo test -p sukoon-integration-tests --test admin

use rust_decimal::Decimal;
use tempfile::TempDir;

use sukoon_core::{CurrencyCode, ViewState};
use sukoon_integration_tests::{FAKE_PRESET, FakeProviders};
use sukoon_storefront::admin::ProductDraft;
use sukoon_storefront::catalog::LOCAL_SLOT_NAME;
use sukoon_storefront::services::media::ImageFile;
use sukoon_storefront::settings::SettingsUpdate;
use sukoon_storefront::{AppError, AppState, Storefront};

async fn logged_in(extra: &[(&str, &str)]) -> (FakeProviders, TempDir, Storefront) {
    let providers = FakeProviders::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let state =
        AppState::new(providers.config(dir.path(), extra)).expect("Failed to build app state");
    let mut shop = Storefront::new(state);

    assert_eq!(shop.navigate(ViewState::Admin).await, ViewState::Login);
    shop.submit_admin_pin("2468").await.expect("PIN rejected");
    assert_eq!(shop.view(), ViewState::Admin);
    (providers, dir, shop)
}

fn draft() -> ProductDraft {
    ProductDraft {
        name: "Oud".into(),
        item_code: "SKN-002".into(),
        destination_url: "https://pay.example/oud".into(),
        description: "Attar".into(),
        price: "20".into(),
        image: Some(ImageFile {
            file_name: "oud.jpg".into(),
            mime_type: "image/jpeg",
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        }),
    }
}

#[tokio::test]
async fn test_publish_uploads_image_then_saves() {
    let (providers, _dir, mut shop) = logged_in(&[("SHOP_ADMIN_PIN", "2468")]).await;

    shop.publish_product(draft()).await.expect("Publish failed");

    let uploads = providers.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].file_name, "oud.jpg");
    assert_eq!(uploads[0].content_type, "image/jpeg");
    assert_eq!(uploads[0].upload_preset, FAKE_PRESET);
    assert_eq!(uploads[0].len, 4);

    let stored = providers.stored_products();
    assert_eq!(stored.len(), 1);
    assert_eq!(
        stored[0].string("imageUrl"),
        "https://res.cloudinary.test/sukoon/image/upload/v1/oud.jpg"
    );
    assert_eq!(stored[0].fields["price"]["integerValue"], "20");

    // The list was reloaded after publishing.
    assert_eq!(shop.products().len(), 1);
    assert_eq!(shop.products()[0].price, Decimal::from(20));

    shop.set_currency(CurrencyCode::USD);
    shop.navigate(ViewState::Shop).await;
    assert_eq!(shop.shop_page().cards[0].price_label(), "$ 140.00");
}

#[tokio::test]
async fn test_upload_failure_saves_nothing() {
    let (providers, dir, mut shop) = logged_in(&[("SHOP_ADMIN_PIN", "2468")]).await;
    providers.set_cloudinary_down(true);

    let err = shop.publish_product(draft()).await.expect_err("Publish should fail");
    assert_eq!(err.user_message(), "Failed to save product");
    assert!(err.is_fault());

    assert!(providers.stored_products().is_empty());
    assert!(!dir.path().join(LOCAL_SLOT_NAME).exists());
}

#[tokio::test]
async fn test_validation_happens_before_upload() {
    let (providers, _dir, mut shop) = logged_in(&[("SHOP_ADMIN_PIN", "2468")]).await;

    let mut no_image = draft();
    no_image.image = None;
    let err = shop.publish_product(no_image).await.expect_err("Image is required");
    assert_eq!(err.user_message(), "Please select an image");
    assert!(!err.is_fault());

    let mut bad_price = draft();
    bad_price.price = "-3".into();
    assert!(matches!(
        shop.publish_product(bad_price).await,
        Err(AppError::Admin(_))
    ));

    let mut huge_price = draft();
    huge_price.price = "1000000000000000000000000000".into();
    let err = shop.publish_product(huge_price).await.expect_err("Price is capped");
    assert_eq!(err.user_message(), "Price cannot exceed 1000000000000");

    assert!(providers.uploads().is_empty());
    assert!(providers.stored_products().is_empty());
}

#[tokio::test]
async fn test_settings_change_rates_and_pin() {
    let (_providers, _dir, mut shop) = logged_in(&[("SHOP_ADMIN_PIN", "2468")]).await;
    shop.publish_product(draft()).await.expect("Publish failed");

    shop.update_settings(SettingsUpdate {
        exchange_rate_pkr: Some(Decimal::from(300)),
        admin_pin: Some("1357".to_string().into()),
        ..SettingsUpdate::default()
    })
    .expect("Settings rejected");

    shop.navigate(ViewState::Shop).await;
    assert_eq!(shop.shop_page().cards[0].price_label(), "Rs. 6,120");

    shop.admin_logout().await;
    assert!(shop.update_settings(SettingsUpdate::default()).is_err());

    shop.navigate(ViewState::Admin).await;
    assert!(shop.submit_admin_pin("2468").await.is_err());
    shop.submit_admin_pin("1357").await.expect("New PIN rejected");
    assert_eq!(shop.view(), ViewState::Admin);
}
