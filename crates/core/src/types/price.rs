//! Type-safe price representation using decimal arithmetic.
//!
//! Base prices are stored in USD. Display prices are obtained by converting
//! with the shop's exchange rates and then adding the flat service surcharge,
//! which is denominated in whatever currency is being displayed:
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use sukoon_core::{CurrencyCode, ExchangeRates, Price};
//!
//! let rates = ExchangeRates::default();
//! let price = Price::for_display(Decimal::from(15), CurrencyCode::PKR, &rates).unwrap();
//!
//! assert_eq!(price.amount, Decimal::from(4320));
//! assert_eq!(price.label(), "Rs. 4,320");
//! ```

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Flat service surcharge added after currency conversion.
///
/// Not converted: 120 is added as 120 PKR, 120 USD or 120 AED.
pub const SERVICE_SURCHARGE: Decimal = Decimal::from_parts(120, 0, 0, false, 0);

/// Largest base price (in USD) the admin panel accepts: 1,000,000,000,000.
pub const MAX_BASE_PRICE: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Largest exchange rate the shop accepts.
pub const MAX_EXCHANGE_RATE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Number of decimal places prices are rounded to before display.
const DISPLAY_DECIMALS: u32 = 2;

/// Error returned when a currency code is not one the shop sells in.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency: {0} (expected PKR, USD or AED)")]
pub struct CurrencyError(pub String);

/// Error returned when a display price does not fit in a `Decimal`.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("display price of {base} USD in {currency} is out of range")]
pub struct PriceOverflow {
    pub base: Decimal,
    pub currency: CurrencyCode,
}

/// Currencies accepted at the storefront boundary.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    /// Pakistani rupee.
    #[default]
    PKR,
    /// US dollar, the currency base prices are stored in.
    USD,
    /// UAE dirham.
    AED,
}

impl CurrencyCode {
    /// All supported currencies, in selector order.
    pub const ALL: [Self; 3] = [Self::PKR, Self::USD, Self::AED];

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::PKR => "PKR",
            Self::USD => "USD",
            Self::AED => "AED",
        }
    }

    /// Symbol shown in front of a formatted amount.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::PKR => "Rs.",
            Self::USD => "$",
            Self::AED => "AED",
        }
    }

    /// Whether amounts always show two decimal places.
    ///
    /// PKR and AED drop trailing zeros instead.
    #[must_use]
    pub const fn fixed_decimals(self) -> bool {
        matches!(self, Self::USD)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PKR" => Ok(Self::PKR),
            "USD" => Ok(Self::USD),
            "AED" => Ok(Self::AED),
            other => Err(CurrencyError(other.to_string())),
        }
    }
}

/// USD exchange rates configured by the shop admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRates {
    /// 1 USD in PKR.
    pub pkr: Decimal,
    /// 1 USD in AED.
    pub aed: Decimal,
}

impl Default for ExchangeRates {
    fn default() -> Self {
        Self {
            pkr: Decimal::from(280),
            aed: Decimal::new(367, 2),
        }
    }
}

impl ExchangeRates {
    /// Multiplier applied to a USD base price for the given currency.
    #[must_use]
    pub const fn multiplier(&self, currency: CurrencyCode) -> Decimal {
        match currency {
            CurrencyCode::USD => Decimal::ONE,
            CurrencyCode::PKR => self.pkr,
            CurrencyCode::AED => self.aed,
        }
    }
}

/// A price in a display currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Compute the customer-facing price of a USD base price.
    ///
    /// Multiplies by the currency's rate first and then adds
    /// [`SERVICE_SURCHARGE`]. The order matters for output parity.
    ///
    /// # Errors
    ///
    /// Returns [`PriceOverflow`] if either step leaves the `Decimal` range.
    pub fn for_display(
        base_usd: Decimal,
        currency: CurrencyCode,
        rates: &ExchangeRates,
    ) -> Result<Self, PriceOverflow> {
        base_usd
            .checked_mul(rates.multiplier(currency))
            .and_then(|converted| converted.checked_add(SERVICE_SURCHARGE))
            .map(|amount| Self::new(amount, currency))
            .ok_or(PriceOverflow {
                base: base_usd,
                currency,
            })
    }

    /// Amount formatted for display, without the currency symbol.
    ///
    /// Rounds half away from zero to two decimals and groups thousands with
    /// commas. USD always shows two decimals; PKR and AED trim trailing zeros.
    #[must_use]
    pub fn formatted_amount(&self) -> String {
        let mut rounded = self
            .amount
            .round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
        if self.currency_code.fixed_decimals() {
            rounded.rescale(DISPLAY_DECIMALS);
        } else {
            rounded = rounded.normalize();
        }

        let digits = rounded.abs().to_string();
        let (whole, fraction) = digits
            .split_once('.')
            .map_or((digits.as_str(), None), |(w, f)| (w, Some(f)));

        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            out.push('-');
        }
        out.push_str(&group_thousands(whole));
        if let Some(fraction) = fraction {
            out.push('.');
            out.push_str(fraction);
        }
        out
    }

    /// Symbol and amount, as shown on a product card (e.g. `$ 135.00`).
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.currency_code.symbol(), self.formatted_amount())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Insert a comma every three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn display(base: Decimal, currency: CurrencyCode) -> Price {
        Price::for_display(base, currency, &ExchangeRates::default()).unwrap()
    }

    #[test]
    fn test_usd_adds_surcharge_without_conversion() {
        let price = display(Decimal::from(15), CurrencyCode::USD);
        assert_eq!(price.amount, Decimal::from(135));
        assert_eq!(price.formatted_amount(), "135.00");
        assert_eq!(price.label(), "$ 135.00");
    }

    #[test]
    fn test_pkr_multiplies_then_adds() {
        let price = display(Decimal::from(15), CurrencyCode::PKR);
        assert_eq!(price.amount, Decimal::from(4320));
        assert_eq!(price.formatted_amount(), "4,320");
        assert_eq!(price.label(), "Rs. 4,320");
    }

    #[test]
    fn test_aed_keeps_significant_decimals() {
        let price = display(Decimal::from(15), CurrencyCode::AED);
        assert_eq!(price.amount, Decimal::new(17505, 2));
        assert_eq!(price.formatted_amount(), "175.05");
        assert_eq!(price.label(), "AED 175.05");
    }

    #[test]
    fn test_formula_holds_for_every_currency() {
        let rates = ExchangeRates {
            pkr: Decimal::new(27875, 2),
            aed: Decimal::new(3673, 3),
        };
        for base in [Decimal::ZERO, Decimal::new(1999, 2), Decimal::from(250)] {
            for currency in CurrencyCode::ALL {
                let price = Price::for_display(base, currency, &rates).unwrap();
                assert_eq!(
                    price.amount,
                    base * rates.multiplier(currency) + SERVICE_SURCHARGE
                );
            }
        }
    }

    #[test]
    fn test_out_of_range_amounts_are_errors() {
        let defaults = ExchangeRates::default();
        let huge = Decimal::from_str("1000000000000000000000000000").unwrap();

        let err = Price::for_display(huge, CurrencyCode::PKR, &defaults).unwrap_err();
        assert_eq!(err.base, huge);
        assert_eq!(err.currency, CurrencyCode::PKR);

        // USD is not converted, but the surcharge still has to fit.
        assert!(Price::for_display(Decimal::MAX, CurrencyCode::USD, &defaults).is_err());

        let rates = ExchangeRates {
            pkr: Decimal::from_str("100000000000000000000").unwrap(),
            aed: Decimal::ONE,
        };
        let base = Decimal::from(1_000_000_000);
        assert!(Price::for_display(base, CurrencyCode::PKR, &rates).is_err());
        assert!(Price::for_display(base, CurrencyCode::AED, &rates).is_ok());
    }

    #[test]
    fn test_limits_stay_in_range() {
        assert_eq!(MAX_BASE_PRICE, Decimal::from(1_000_000_000_000_i64));
        assert_eq!(MAX_EXCHANGE_RATE, Decimal::from(1_000_000));
        let rates = ExchangeRates {
            pkr: MAX_EXCHANGE_RATE,
            aed: MAX_EXCHANGE_RATE,
        };
        for currency in CurrencyCode::ALL {
            assert!(Price::for_display(MAX_BASE_PRICE, currency, &rates).is_ok());
        }
        let price = Price::for_display(MAX_BASE_PRICE, CurrencyCode::PKR, &rates).unwrap();
        assert_eq!(price.label(), "Rs. 1,000,000,000,000,000,120");
    }

    #[test]
    fn test_zero_base_price_is_just_the_surcharge() {
        assert_eq!(display(Decimal::ZERO, CurrencyCode::PKR).label(), "Rs. 120");
        assert_eq!(display(Decimal::ZERO, CurrencyCode::USD).label(), "$ 120.00");
    }

    #[test]
    fn test_trailing_zeros_trimmed_for_pkr() {
        // 0.5 * 280 + 120 = 260.0
        let price = display(Decimal::new(5, 1), CurrencyCode::PKR);
        assert_eq!(price.formatted_amount(), "260");

        // 1.25 * 3.67 + 120 = 124.5875 -> 124.59
        let price = display(Decimal::new(125, 2), CurrencyCode::AED);
        assert_eq!(price.formatted_amount(), "124.59");

        // 0.5 * 3.67 + 120 = 121.835 -> 121.84 (half away from zero)
        let price = display(Decimal::new(5, 1), CurrencyCode::AED);
        assert_eq!(price.formatted_amount(), "121.84");
    }

    #[test]
    fn test_thousands_grouping() {
        let price = Price::new(Decimal::new(123_456_789, 2), CurrencyCode::USD);
        assert_eq!(price.formatted_amount(), "1,234,567.89");

        let price = Price::new(Decimal::from(1_000_000), CurrencyCode::PKR);
        assert_eq!(price.formatted_amount(), "1,000,000");
    }

    #[test]
    fn test_currency_parse_is_strict() {
        assert_eq!("PKR".parse::<CurrencyCode>().unwrap(), CurrencyCode::PKR);
        assert_eq!("USD".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert_eq!("AED".parse::<CurrencyCode>().unwrap(), CurrencyCode::AED);
        assert!("usd".parse::<CurrencyCode>().is_err());
        assert!("EUR".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_default_currency_is_pkr() {
        assert_eq!(CurrencyCode::default(), CurrencyCode::PKR);
    }
}
