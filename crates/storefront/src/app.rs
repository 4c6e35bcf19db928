//! The storefront as one object a front end can drive.
//!
//! [`Storefront`] owns the [`ViewController`] and the currently displayed
//! product list, and re-reads the catalog whenever the screen changes.

use tracing::instrument;

use sukoon_core::{CurrencyCode, ProductId, ViewState};

use crate::account::{SignInFlow, SignInOutcome};
use crate::admin::{Inventory, ProductDraft};
use crate::controller::{UserAuthToggle, ViewController};
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::services::transcription::AudioClip;
use crate::settings::SettingsUpdate;
use crate::shop::ShopPage;
use crate::state::AppState;

/// Storefront session: screen state plus provider clients.
pub struct Storefront {
    state: AppState,
    controller: ViewController,
    products: Vec<Product>,
}

impl Storefront {
    /// Start on the shop screen with the configured initial settings. The
    /// product list is empty until [`refresh`](Self::refresh) runs.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        let controller = ViewController::new(state.config().initial_settings.clone());
        Self {
            state,
            controller,
            products: Vec::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub const fn controller(&self) -> &ViewController {
        &self.controller
    }

    #[must_use]
    pub const fn view(&self) -> ViewState {
        self.controller.view()
    }

    /// Products as last loaded, newest first.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Reload the product list.
    pub async fn refresh(&mut self) {
        self.products = self.state.catalog().list_products().await;
        self.sync_user_auth();
    }

    fn sync_user_auth(&mut self) {
        self.controller
            .set_user_authenticated(self.state.auth().is_authenticated());
    }

    /// Go to a screen. The admin panel diverts to the PIN screen until the
    /// admin logs in.
    pub async fn navigate(&mut self, target: ViewState) -> ViewState {
        let view = self.controller.navigate(target);
        self.refresh().await;
        view
    }

    pub const fn set_currency(&mut self, currency: CurrencyCode) {
        self.controller.set_currency(currency);
    }

    /// The shop screen in the selected currency.
    #[must_use]
    pub fn shop_page(&self) -> ShopPage {
        ShopPage::build(&self.products, &self.controller)
    }

    /// Checkout URL for a displayed product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown ID and `AppError::Checkout`
    /// if the item has no destination.
    pub fn buy_now(&self, id: &ProductId) -> Result<String> {
        let page = self.shop_page();
        let card = page
            .card(id)
            .ok_or_else(|| AppError::NotFound(format!("Product {id}")))?;
        Ok(card.buy_now()?.to_string())
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// Enter the admin PIN on the login screen.
    ///
    /// # Errors
    ///
    /// Returns `AppError::View` for a wrong PIN or when not on the login screen.
    pub async fn submit_admin_pin(&mut self, pin: &str) -> Result<()> {
        self.controller.submit_admin_pin(pin)?;
        self.refresh().await;
        Ok(())
    }

    pub async fn cancel_admin_login(&mut self) {
        self.controller.cancel_admin_login();
        self.refresh().await;
    }

    pub async fn admin_logout(&mut self) {
        self.controller.admin_logout();
        self.refresh().await;
    }

    /// Inventory tab.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Admin` unless the admin is logged in.
    pub fn inventory(&self) -> Result<Inventory<'_>> {
        Ok(Inventory::open(
            &self.controller,
            self.state.catalog(),
            self.state.media(),
        )?)
    }

    /// Publish a new product and reload the list.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Admin` for validation, upload or save failures.
    #[instrument(skip(self, draft))]
    pub async fn publish_product(&mut self, draft: ProductDraft) -> Result<()> {
        self.inventory()?.publish(draft).await?;
        self.refresh().await;
        Ok(())
    }

    /// Delete a product after confirmation. Returns whether it was deleted.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Admin` if not logged in or both backends failed.
    pub async fn remove_product(
        &mut self,
        id: &ProductId,
        confirm: impl FnOnce(&str) -> bool + Send,
    ) -> Result<bool> {
        let inventory = Inventory::open(
            &self.controller,
            self.state.catalog(),
            self.state.media(),
        )?;
        Ok(inventory.remove(id, confirm, &mut self.products).await?)
    }

    /// Apply a settings change from the settings tab.
    ///
    /// # Errors
    ///
    /// Returns `AppError::View` unless the admin is logged in.
    pub fn update_settings(&mut self, update: SettingsUpdate) -> Result<()> {
        Ok(self.controller.update_settings(update)?)
    }

    // =========================================================================
    // Customer accounts
    // =========================================================================

    /// The account button. Signs out when the customer confirms.
    pub async fn toggle_user_auth(&mut self, confirm: impl FnOnce(&str) -> bool) -> UserAuthToggle {
        self.sync_user_auth();
        let outcome = self.controller.toggle_user_auth(confirm);
        match outcome {
            UserAuthToggle::SignOutConfirmed => {
                self.state.auth().sign_out();
                self.sync_user_auth();
            }
            UserAuthToggle::OpenedSignIn => self.refresh().await,
            UserAuthToggle::Declined => {}
        }
        outcome
    }

    /// Submit the sign-in screen's current step. Returns to the shop on success.
    pub async fn submit_sign_in(&mut self, flow: &mut SignInFlow) -> SignInOutcome {
        let outcome = flow.submit(self.state.auth()).await;
        if matches!(outcome, SignInOutcome::SignedIn(_)) {
            self.controller.user_login_succeeded();
            self.refresh().await;
        }
        outcome
    }

    /// "Forgot password" on the sign-in screen.
    pub async fn forgot_password(&self, flow: &mut SignInFlow) {
        flow.forgot_password(self.state.auth()).await;
    }

    pub async fn cancel_user_login(&mut self) {
        self.controller.user_login_cancelled();
        self.refresh().await;
    }

    // =========================================================================
    // Voice
    // =========================================================================

    /// Transcribe a voice clip from the shop screen.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if transcription is switched off in
    /// settings or no provider is configured. Provider faults do not error;
    /// they come back as a placeholder sentence.
    pub async fn transcribe(&self, clip: &AudioClip) -> Result<String> {
        if !self.controller.settings().transcription_enabled {
            return Err(AppError::BadRequest(
                "Voice transcription is turned off.".to_string(),
            ));
        }
        let transcriber = self.state.transcriber().ok_or_else(|| {
            AppError::BadRequest("Voice transcription is not configured.".to_string())
        })?;
        Ok(transcriber.transcribe_clip(clip).await)
    }
}
