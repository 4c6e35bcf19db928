//! Shop-wide settings.
//!
//! A single unkeyed record, built from defaults at start-up and kept in memory
//! only. The admin panel is the one writer (see
//! [`ViewController::update_settings`](crate::controller::ViewController::update_settings)).

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use sukoon_core::ExchangeRates;

/// Built-in admin PIN used when `SHOP_ADMIN_PIN` is not set.
pub const DEFAULT_ADMIN_PIN: &str = "SUKOON36549801";

/// Built-in admin recovery page.
pub const DEFAULT_ADMIN_RESET_URL: &str = "https://sukoonbase.com/admin-recovery";

/// Shop-wide configuration edited from the admin panel.
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Show the Google sign-in option on the account screen.
    pub google_login_enabled: bool,
    /// Show the voice transcription panel on the shop screen.
    pub transcription_enabled: bool,
    /// 1 USD in PKR.
    pub exchange_rate_pkr: Decimal,
    /// 1 USD in AED.
    pub exchange_rate_aed: Decimal,
    /// Admin access PIN. Compared verbatim.
    pub admin_pin: SecretString,
    /// Where a locked-out admin recovers access.
    pub admin_reset_url: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        let rates = ExchangeRates::default();
        Self {
            google_login_enabled: true,
            transcription_enabled: false,
            exchange_rate_pkr: rates.pkr,
            exchange_rate_aed: rates.aed,
            admin_pin: SecretString::from(DEFAULT_ADMIN_PIN),
            admin_reset_url: DEFAULT_ADMIN_RESET_URL.to_string(),
        }
    }
}

impl AppSettings {
    /// Current exchange rates for price display.
    #[must_use]
    pub const fn exchange_rates(&self) -> ExchangeRates {
        ExchangeRates {
            pkr: self.exchange_rate_pkr,
            aed: self.exchange_rate_aed,
        }
    }

    /// Check a PIN attempt against the configured admin PIN.
    ///
    /// Exact string equality: no trimming, no case folding.
    #[must_use]
    pub fn verify_admin_pin(&self, attempt: &str) -> bool {
        self.admin_pin.expose_secret() == attempt
    }

    /// Merge a partial update over the current values.
    pub fn apply(&mut self, update: SettingsUpdate) {
        let SettingsUpdate {
            google_login_enabled,
            transcription_enabled,
            exchange_rate_pkr,
            exchange_rate_aed,
            admin_pin,
            admin_reset_url,
        } = update;

        if let Some(v) = google_login_enabled {
            self.google_login_enabled = v;
        }
        if let Some(v) = transcription_enabled {
            self.transcription_enabled = v;
        }
        if let Some(v) = exchange_rate_pkr {
            self.exchange_rate_pkr = v;
        }
        if let Some(v) = exchange_rate_aed {
            self.exchange_rate_aed = v;
        }
        if let Some(v) = admin_pin {
            self.admin_pin = v;
        }
        if let Some(v) = admin_reset_url {
            self.admin_reset_url = v;
        }
    }
}

/// A partial settings change. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub google_login_enabled: Option<bool>,
    pub transcription_enabled: Option<bool>,
    pub exchange_rate_pkr: Option<Decimal>,
    pub exchange_rate_aed: Option<Decimal>,
    pub admin_pin: Option<SecretString>,
    pub admin_reset_url: Option<String>,
}

impl SettingsUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.google_login_enabled.is_none()
            && self.transcription_enabled.is_none()
            && self.exchange_rate_pkr.is_none()
            && self.exchange_rate_aed.is_none()
            && self.admin_pin.is_none()
            && self.admin_reset_url.is_none()
    }
}
