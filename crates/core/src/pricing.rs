//! Order total computation: subtotal, GST and grand total.
//!
//! Amounts keep full decimal precision; rounding to paise only happens when a
//! [`Price`] is rendered.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Price;

/// Anything that contributes `unit_price × quantity` to a subtotal.
pub trait PricedLine {
    fn unit_price(&self) -> Decimal;
    fn quantity(&self) -> u32;

    /// `unit_price × quantity`.
    fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity())
    }
}

/// Errors from constructing a [`TaxRate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxRateError {
    #[error("tax rate must be between 0 and 1, got {0}")]
    OutOfRange(Decimal),
}

/// A tax rate as a fraction, e.g. `0.05` for 5% GST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// Create a tax rate from a fraction in `0..=1`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxRateError::OutOfRange`] for negative rates or rates
    /// above 100%.
    pub fn new(rate: Decimal) -> Result<Self, TaxRateError> {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(TaxRateError::OutOfRange(rate));
        }
        Ok(Self(rate.normalize()))
    }

    /// Create a tax rate from a percentage, e.g. `5` for 5%.
    ///
    /// # Errors
    ///
    /// Returns [`TaxRateError::OutOfRange`] unless `percent` is in `0..=100`.
    pub fn from_percent(percent: Decimal) -> Result<Self, TaxRateError> {
        Self::new(percent / Decimal::ONE_HUNDRED)
    }

    /// The rate as a fraction.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// The rate as a percentage, e.g. `5` or `12.5`.
    #[must_use]
    pub fn percent(&self) -> Decimal {
        (self.0 * Decimal::ONE_HUNDRED).normalize()
    }

    /// User-facing label, e.g. `GST (5%)`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("GST ({}%)", self.percent())
    }
}

impl TryFrom<Decimal> for TaxRate {
    type Error = TaxRateError;

    fn try_from(rate: Decimal) -> Result<Self, Self::Error> {
        Self::new(rate)
    }
}

impl From<TaxRate> for Decimal {
    fn from(rate: TaxRate) -> Self {
        rate.0
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Subtotal, tax and total for a set of lines at one tax rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax_rate: TaxRate,
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// Compute totals for `lines` at `tax_rate`.
    ///
    /// ```
    /// use isra_cafe_core::{OrderTotals, PricedLine, TaxRate};
    /// use rust_decimal::Decimal;
    ///
    /// struct Line(Decimal, u32);
    /// impl PricedLine for Line {
    ///     fn unit_price(&self) -> Decimal { self.0 }
    ///     fn quantity(&self) -> u32 { self.1 }
    /// }
    ///
    /// let rate = TaxRate::new(Decimal::new(18, 2)).unwrap();
    /// let totals = OrderTotals::compute(&[Line(Decimal::ONE_HUNDRED, 2)], rate);
    /// assert_eq!(totals.subtotal, Decimal::new(200, 0));
    /// assert_eq!(totals.tax_display(), "₹36.00");
    /// assert_eq!(totals.total_display(), "₹236.00");
    /// ```
    pub fn compute<'a, L, I>(lines: I, tax_rate: TaxRate) -> Self
    where
        L: PricedLine + 'a,
        I: IntoIterator<Item = &'a L>,
    {
        let subtotal: Decimal = lines.into_iter().map(|line| line.line_total()).sum();
        Self::from_subtotal(subtotal, tax_rate)
    }

    /// Totals for an already summed subtotal.
    #[must_use]
    pub fn from_subtotal(subtotal: Decimal, tax_rate: TaxRate) -> Self {
        let tax = subtotal * tax_rate.as_decimal();
        Self {
            subtotal,
            tax_rate,
            tax,
            total: subtotal + tax,
        }
    }

    #[must_use]
    pub fn subtotal_display(&self) -> String {
        Price::inr(self.subtotal).display()
    }

    #[must_use]
    pub fn tax_display(&self) -> String {
        Price::inr(self.tax).display()
    }

    #[must_use]
    pub fn total_display(&self) -> String {
        Price::inr(self.total).display()
    }

    /// Label for the tax row, derived from the rate.
    #[must_use]
    pub fn tax_label(&self) -> String {
        self.tax_rate.label()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone)]
    struct Line {
        price: Decimal,
        quantity: u32,
    }

    impl PricedLine for Line {
        fn unit_price(&self) -> Decimal {
            self.price
        }

        fn quantity(&self) -> u32 {
            self.quantity
        }
    }

    fn line(price: i64, quantity: u32) -> Line {
        Line {
            price: Decimal::new(price, 2),
            quantity,
        }
    }

    #[test]
    fn test_gst_at_eighteen_percent() {
        let rate = TaxRate::new(Decimal::new(18, 2)).unwrap();
        let totals = OrderTotals::compute(&[line(10_000, 2)], rate);

        assert_eq!(totals.subtotal, Decimal::new(200, 0));
        assert_eq!(totals.tax, Decimal::new(36, 0));
        assert_eq!(totals.total, Decimal::new(236, 0));
        assert_eq!(totals.tax_display(), "₹36.00");
        assert_eq!(totals.total_display(), "₹236.00");
        assert_eq!(totals.tax_label(), "GST (18%)");
    }

    #[test]
    fn test_empty_lines_are_zero() {
        let rate = TaxRate::from_percent(Decimal::new(5, 0)).unwrap();
        let totals = OrderTotals::compute(&Vec::<Line>::new(), rate);
        assert!(totals.subtotal.is_zero());
        assert!(totals.total.is_zero());
        assert_eq!(totals.subtotal_display(), "₹0.00");
    }

    #[test]
    fn test_tax_keeps_full_precision() {
        let rate = TaxRate::from_percent(Decimal::new(5, 0)).unwrap();
        let totals = OrderTotals::compute(&[line(999, 1)], rate);
        // 9.99 * 0.05 = 0.4995, rounded only for display
        assert_eq!(totals.tax, Decimal::new(4995, 4));
        assert_eq!(totals.tax_display(), "₹0.50");
    }

    #[test]
    fn test_rate_bounds() {
        assert!(TaxRate::new(Decimal::ZERO).is_ok());
        assert!(TaxRate::new(Decimal::ONE).is_ok());
        assert!(TaxRate::new(Decimal::new(-1, 2)).is_err());
        assert!(TaxRate::from_percent(Decimal::new(101, 0)).is_err());
    }

    #[test]
    fn test_label_matches_rate() {
        let rate = TaxRate::from_percent(Decimal::new(5, 0)).unwrap();
        assert_eq!(rate.label(), "GST (5%)");
        assert_eq!(rate.as_decimal(), Decimal::new(5, 2));

        let fractional = TaxRate::from_percent(Decimal::new(125, 1)).unwrap();
        assert_eq!(fractional.label(), "GST (12.5%)");
    }

    #[test]
    fn test_rate_serde_rejects_out_of_range() {
        let rate: TaxRate = serde_json::from_str("\"0.05\"").unwrap();
        assert_eq!(rate.percent(), Decimal::new(5, 0));
        assert!(serde_json::from_str::<TaxRate>("\"1.5\"").is_err());
    }

    fn lines_strategy() -> impl Strategy<Value = Vec<Line>> {
        prop::collection::vec((0i64..1_000_000, 1u32..50), 0..20)
            .prop_map(|raw| raw.into_iter().map(|(p, q)| line(p, q)).collect())
    }

    proptest! {
        #[test]
        fn test_subtotal_is_order_independent(lines in lines_strategy()) {
            let rate = TaxRate::from_percent(Decimal::new(5, 0)).unwrap();
            let forward = OrderTotals::compute(&lines, rate);
            let mut reversed = lines.clone();
            reversed.reverse();
            let backward = OrderTotals::compute(&reversed, rate);
            prop_assert_eq!(forward, backward);
        }

        #[test]
        fn test_total_is_subtotal_times_one_plus_rate(
            lines in lines_strategy(),
            percent in 0i64..=100,
        ) {
            let rate = TaxRate::from_percent(Decimal::new(percent, 0)).unwrap();
            let totals = OrderTotals::compute(&lines, rate);
            prop_assert_eq!(totals.total, totals.subtotal * (Decimal::ONE + rate.as_decimal()));
            prop_assert!(totals.total >= totals.subtotal);
        }
    }
}
