//! Screen state machine.
//!
//! ```text
//!            navigate(admin), not authenticated
//!   shop ───────────────────────────────────────▶ login
//!    ▲  ◀──────────── cancel ──────────────────── │
//!    │                                            │ correct PIN
//!    │ ◀──────────── logout ───────────── admin ◀─┘
//!    │
//!    └──── success / cancel ──── user-login ◀── toggle (signed out)
//! ```
//!
//! The only way into `admin` is a correct PIN on the `login` screen; after
//! that, `admin` stays directly reachable until logout.

use thiserror::Error;
use tracing::{debug, info};

use sukoon_core::{CurrencyCode, ExchangeRates, ViewState};

use crate::error::add_breadcrumb;
use crate::settings::{AppSettings, SettingsUpdate};

/// Confirmation shown before signing a customer out.
pub const SIGN_OUT_CONFIRMATION: &str = "Are you sure you want to sign out?";

/// Rejected screen transitions.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ControllerError {
    #[error("Invalid Access PIN. Please try again.")]
    InvalidPin,

    #[error("Admin PIN can only be entered on the login screen.")]
    NotOnLoginScreen,

    #[error("Admin access required.")]
    AdminRequired,
}

/// Outcome of the account button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAuthToggle {
    /// Signed out: the sign-in screen is now showing.
    OpenedSignIn,
    /// Signed in and the customer confirmed: the caller must sign out.
    SignOutConfirmed,
    /// Signed in and the customer declined: nothing changed.
    Declined,
}

/// Current screen, selected currency, authentication flags and settings.
#[derive(Debug, Clone, Default)]
pub struct ViewController {
    view: ViewState,
    currency: CurrencyCode,
    admin_authenticated: bool,
    user_authenticated: bool,
    settings: AppSettings,
}

impl ViewController {
    /// Start on the shop screen with the given settings.
    #[must_use]
    pub fn new(settings: AppSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn view(&self) -> ViewState {
        self.view
    }

    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    #[must_use]
    pub const fn is_admin_authenticated(&self) -> bool {
        self.admin_authenticated
    }

    #[must_use]
    pub const fn is_user_authenticated(&self) -> bool {
        self.user_authenticated
    }

    #[must_use]
    pub const fn settings(&self) -> &AppSettings {
        &self.settings
    }

    #[must_use]
    pub const fn exchange_rates(&self) -> ExchangeRates {
        self.settings.exchange_rates()
    }

    /// Whether the navbar and footer are shown.
    #[must_use]
    pub const fn shows_layout(&self) -> bool {
        !self.view.hides_layout()
    }

    fn set_view(&mut self, view: ViewState) -> ViewState {
        if view != self.view {
            debug!(from = %self.view, to = %view, "View changed");
            add_breadcrumb(
                "navigation",
                &format!("Opened {view}"),
                Some(&[("from", self.view.to_string().as_str())]),
            );
            self.view = view;
        }
        self.view
    }

    /// Go to `target`, diverting to the PIN screen if it is the admin panel
    /// and the admin has not logged in.
    pub fn navigate(&mut self, target: ViewState) -> ViewState {
        if target == ViewState::Admin && !self.admin_authenticated {
            return self.set_view(ViewState::Login);
        }
        self.set_view(target)
    }

    pub const fn set_currency(&mut self, currency: CurrencyCode) {
        self.currency = currency;
    }

    /// Check a PIN entered on the login screen.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NotOnLoginScreen` outside the login screen and
    /// `ControllerError::InvalidPin` for a wrong PIN (staying on login).
    pub fn submit_admin_pin(&mut self, attempt: &str) -> Result<(), ControllerError> {
        if self.view != ViewState::Login {
            return Err(ControllerError::NotOnLoginScreen);
        }
        if !self.settings.verify_admin_pin(attempt) {
            info!("Rejected admin PIN");
            return Err(ControllerError::InvalidPin);
        }

        info!("Admin logged in");
        self.admin_authenticated = true;
        self.set_view(ViewState::Admin);
        Ok(())
    }

    /// Leave the PIN screen without logging in.
    pub fn cancel_admin_login(&mut self) -> ViewState {
        if self.view == ViewState::Login {
            self.set_view(ViewState::Shop);
        }
        self.view
    }

    /// End the admin session.
    pub fn admin_logout(&mut self) {
        if self.admin_authenticated {
            info!("Admin logged out");
        }
        self.admin_authenticated = false;
        self.set_view(ViewState::Shop);
    }

    /// The customer signed in or signed up.
    pub fn user_login_succeeded(&mut self) {
        self.user_authenticated = true;
        self.set_view(ViewState::Shop);
    }

    /// The customer backed out of the sign-in screen.
    pub fn user_login_cancelled(&mut self) {
        self.set_view(ViewState::Shop);
    }

    /// Mirror the identity provider's state.
    pub const fn set_user_authenticated(&mut self, signed_in: bool) {
        self.user_authenticated = signed_in;
    }

    /// The account button: open sign-in when signed out, otherwise ask
    /// `confirm` (with [`SIGN_OUT_CONFIRMATION`]) whether to sign out.
    pub fn toggle_user_auth(&mut self, confirm: impl FnOnce(&str) -> bool) -> UserAuthToggle {
        if !self.user_authenticated {
            self.set_view(ViewState::UserLogin);
            return UserAuthToggle::OpenedSignIn;
        }
        if confirm(SIGN_OUT_CONFIRMATION) {
            UserAuthToggle::SignOutConfirmed
        } else {
            UserAuthToggle::Declined
        }
    }

    /// Apply a settings change from the admin panel. Takes effect at once.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::AdminRequired` unless the admin is logged in.
    pub fn update_settings(&mut self, update: SettingsUpdate) -> Result<(), ControllerError> {
        if !self.admin_authenticated {
            return Err(ControllerError::AdminRequired);
        }
        if update.is_empty() {
            return Ok(());
        }
        self.settings.apply(update);
        info!("Shop settings updated");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use secrecy::SecretString;

    use super::*;
    use crate::settings::DEFAULT_ADMIN_PIN;

    const ALL_VIEWS: [ViewState; 4] = [
        ViewState::Shop,
        ViewState::Admin,
        ViewState::Login,
        ViewState::UserLogin,
    ];

    #[test]
    fn test_starts_on_shop_in_pkr() {
        let vc = ViewController::default();
        assert_eq!(vc.view(), ViewState::Shop);
        assert_eq!(vc.currency(), CurrencyCode::PKR);
        assert!(vc.shows_layout());
    }

    #[test]
    fn test_admin_unauthenticated_always_lands_on_login() {
        for start in [ViewState::Shop, ViewState::Login, ViewState::UserLogin] {
            let mut vc = ViewController::default();
            vc.navigate(start);
            assert_eq!(vc.navigate(ViewState::Admin), ViewState::Login);
            assert!(!vc.is_admin_authenticated());
            assert!(!vc.shows_layout());
        }
    }

    #[test]
    fn test_wrong_pin_stays_on_login() {
        let mut vc = ViewController::default();
        vc.navigate(ViewState::Admin);

        let err = vc.submit_admin_pin("0000").unwrap_err();
        assert_eq!(err, ControllerError::InvalidPin);
        assert_eq!(err.to_string(), "Invalid Access PIN. Please try again.");
        assert_eq!(vc.view(), ViewState::Login);

        // Exact match only.
        assert!(vc.submit_admin_pin(&format!(" {DEFAULT_ADMIN_PIN}")).is_err());
        assert!(vc.submit_admin_pin(&DEFAULT_ADMIN_PIN.to_lowercase()).is_err());
    }

    #[test]
    fn test_admin_reachable_after_login_until_logout() {
        let mut vc = ViewController::default();
        vc.navigate(ViewState::Admin);
        vc.submit_admin_pin(DEFAULT_ADMIN_PIN).unwrap();
        assert_eq!(vc.view(), ViewState::Admin);

        for view in ALL_VIEWS {
            vc.navigate(view);
            assert_eq!(vc.navigate(ViewState::Admin), ViewState::Admin);
        }

        vc.admin_logout();
        assert_eq!(vc.view(), ViewState::Shop);
        assert_eq!(vc.navigate(ViewState::Admin), ViewState::Login);
    }

    #[test]
    fn test_pin_outside_login_screen_is_refused() {
        let mut vc = ViewController::default();
        assert_eq!(
            vc.submit_admin_pin(DEFAULT_ADMIN_PIN),
            Err(ControllerError::NotOnLoginScreen)
        );
        assert!(!vc.is_admin_authenticated());
        assert_eq!(vc.view(), ViewState::Shop);
    }

    #[test]
    fn test_cancel_login_returns_to_shop() {
        let mut vc = ViewController::default();
        vc.navigate(ViewState::Admin);
        assert_eq!(vc.cancel_admin_login(), ViewState::Shop);
    }

    #[test]
    fn test_user_login_flow() {
        let mut vc = ViewController::default();

        assert_eq!(vc.toggle_user_auth(|_| true), UserAuthToggle::OpenedSignIn);
        assert_eq!(vc.view(), ViewState::UserLogin);
        vc.user_login_cancelled();
        assert_eq!(vc.view(), ViewState::Shop);

        vc.toggle_user_auth(|_| true);
        vc.user_login_succeeded();
        assert_eq!(vc.view(), ViewState::Shop);
        assert!(vc.is_user_authenticated());
    }

    #[test]
    fn test_sign_out_requires_confirmation() {
        let mut vc = ViewController::default();
        vc.set_user_authenticated(true);

        let mut asked = None;
        let outcome = vc.toggle_user_auth(|question| {
            asked = Some(question.to_string());
            false
        });
        assert_eq!(outcome, UserAuthToggle::Declined);
        assert_eq!(asked.as_deref(), Some(SIGN_OUT_CONFIRMATION));
        assert!(vc.is_user_authenticated());
        assert_eq!(vc.view(), ViewState::Shop);

        assert_eq!(
            vc.toggle_user_auth(|_| true),
            UserAuthToggle::SignOutConfirmed
        );
    }

    #[test]
    fn test_settings_need_admin() {
        let mut vc = ViewController::default();
        let update = SettingsUpdate {
            exchange_rate_pkr: Some(Decimal::from(300)),
            ..SettingsUpdate::default()
        };
        assert_eq!(
            vc.update_settings(update.clone()),
            Err(ControllerError::AdminRequired)
        );

        vc.navigate(ViewState::Admin);
        vc.submit_admin_pin(DEFAULT_ADMIN_PIN).unwrap();
        vc.update_settings(update).unwrap();
        assert_eq!(vc.exchange_rates().pkr, Decimal::from(300));
    }

    #[test]
    fn test_changed_pin_takes_effect_immediately() {
        let mut vc = ViewController::default();
        vc.navigate(ViewState::Admin);
        vc.submit_admin_pin(DEFAULT_ADMIN_PIN).unwrap();
        vc.update_settings(SettingsUpdate {
            admin_pin: Some(SecretString::from("1357")),
            ..SettingsUpdate::default()
        })
        .unwrap();
        vc.admin_logout();

        vc.navigate(ViewState::Admin);
        assert!(vc.submit_admin_pin(DEFAULT_ADMIN_PIN).is_err());
        vc.submit_admin_pin("1357").unwrap();
        assert_eq!(vc.view(), ViewState::Admin);
    }
}
