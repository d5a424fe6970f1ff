//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts keep full decimal precision. Rounding to two places happens only
//! when a price is formatted for display.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (rupees, not paise).
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

    /// Create a price in Indian rupees.
    #[must_use]
    pub const fn inr(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::INR)
    }

    /// Amount rounded half away from zero to two decimal places.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Format for display, e.g. `₹236.00`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.rounded())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
}

impl CurrencyCode {
    /// Currency symbol used in rendered prices.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
        }
    }

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_two_places() {
        assert_eq!(Price::inr(Decimal::new(236, 0)).display(), "₹236.00");
        assert_eq!(Price::inr(Decimal::new(45, 1)).display(), "₹4.50");
    }

    #[test]
    fn test_display_rounds_half_away_from_zero() {
        assert_eq!(Price::inr(Decimal::new(10_125, 3)).display(), "₹10.13");
        assert_eq!(Price::inr(Decimal::new(10_124, 3)).display(), "₹10.12");
    }

    #[test]
    fn test_rounding_does_not_touch_stored_amount() {
        let price = Price::inr(Decimal::new(1_999_999, 5));
        assert_eq!(price.rounded(), Decimal::new(2000, 2));
        assert_eq!(price.amount, Decimal::new(1_999_999, 5));
    }

    #[test]
    fn test_currency_codes() {
        assert_eq!(CurrencyCode::default(), CurrencyCode::INR);
        assert_eq!(CurrencyCode::USD.symbol(), "$");
        assert_eq!(CurrencyCode::INR.code(), "INR");
    }
}
