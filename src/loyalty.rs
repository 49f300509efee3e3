//! Loyalty tiers
//!
//! A loyalty program is an ordered list of tiers; the first tier whose
//! predicate accepts the running subtotal wins, so registration order is
//! precedence order. At most one loyalty discount is emitted per checkout.

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::{
    discounts::{Discount, DiscountError, percent_of_minor, percent_points},
    products::Product,
};

/// One loyalty tier: a discount level gated by a subtotal predicate.
pub trait LoyaltyTier: fmt::Debug + Send + Sync {
    /// Tier name, e.g. `"Gold"`.
    fn name(&self) -> &str;

    /// Fractional discount percentage for purchases in this tier.
    fn discount_percent(&self) -> Percentage;

    /// Points multiplier for the points-accrual side feature; never consulted
    /// by the pricing pipeline.
    fn points_multiplier(&self) -> Decimal;

    /// Whether this tier accepts the given subtotal.
    fn is_applicable(&self, subtotal: &Money<'_, Currency>) -> bool;
}

/// A tier eligible at or above a subtotal threshold.
#[derive(Debug, Clone)]
pub struct ThresholdTier<'a> {
    name: String,
    threshold: Money<'a, Currency>,
    percent: Percentage,
    points_multiplier: Decimal,
}

impl<'a> ThresholdTier<'a> {
    /// Create a tier eligible when the subtotal reaches `threshold`.
    pub fn new(
        name: impl Into<String>,
        threshold: Money<'a, Currency>,
        percent: Percentage,
        points_multiplier: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            threshold,
            percent,
            points_multiplier,
        }
    }

    /// Return the subtotal threshold.
    pub fn threshold(&self) -> &Money<'a, Currency> {
        &self.threshold
    }
}

impl LoyaltyTier for ThresholdTier<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn discount_percent(&self) -> Percentage {
        self.percent
    }

    fn points_multiplier(&self) -> Decimal {
        self.points_multiplier
    }

    fn is_applicable(&self, subtotal: &Money<'_, Currency>) -> bool {
        // The threshold is inclusive: a subtotal exactly at the boundary
        // selects this tier.
        subtotal.to_minor_units() >= self.threshold.to_minor_units()
    }
}

/// Whole currency units scaled into minor units for the store currency.
fn major_units(units: i64, currency: &'static Currency) -> Money<'static, Currency> {
    let scale = 10_i64.checked_pow(currency.exponent).unwrap_or(1);

    Money::from_minor(units.saturating_mul(scale), currency)
}

/// An ordered loyalty program.
#[derive(Debug, Default)]
pub struct LoyaltyProgram<'a> {
    tiers: Vec<Box<dyn LoyaltyTier + 'a>>,
}

impl<'a> LoyaltyProgram<'a> {
    /// Create a program with no tiers. Useful when custom tiers must take
    /// precedence: register them in the order they should be tried.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a program with the stock tiers, tried in order: Gold (subtotal
    /// at or above 50.00, 10% off, double points), Silver (at or above 20.00,
    /// 5% off), and a catch-all Basic (0% off).
    pub fn with_default_tiers(currency: &'static Currency) -> LoyaltyProgram<'static> {
        let mut program = LoyaltyProgram::new();

        program.add_tier(Box::new(ThresholdTier::new(
            "Gold",
            major_units(50, currency),
            Percentage::from(0.10),
            Decimal::TWO,
        )));
        program.add_tier(Box::new(ThresholdTier::new(
            "Silver",
            major_units(20, currency),
            Percentage::from(0.05),
            Decimal::new(15, 1),
        )));
        program.add_tier(Box::new(ThresholdTier::new(
            "Basic",
            major_units(0, currency),
            Percentage::from(0.0),
            Decimal::ONE,
        )));

        program
    }

    /// Register a tier after any existing ones.
    pub fn add_tier(&mut self, tier: Box<dyn LoyaltyTier + 'a>) {
        self.tiers.push(tier);
    }

    /// Registered tiers, in precedence order.
    pub fn tiers(&self) -> &[Box<dyn LoyaltyTier + 'a>] {
        &self.tiers
    }

    /// Select the first tier that accepts the subtotal.
    pub fn applicable_tier(&self, subtotal: &Money<'_, Currency>) -> Option<&(dyn LoyaltyTier + 'a)> {
        self.tiers
            .iter()
            .find(|tier| tier.is_applicable(subtotal))
            .map(Box::as_ref)
    }

    /// Compute the loyalty discount for a subtotal, displayed against the
    /// given representative product.
    ///
    /// Returns `Ok(None)` when no tier matches or the selected tier's
    /// percentage is zero.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the percentage arithmetic is
    /// unrepresentable.
    pub fn discount<'m>(
        &self,
        subtotal: Money<'m, Currency>,
        representative: &Product,
    ) -> Result<Option<Discount<'m>>, DiscountError> {
        let Some(tier) = self.applicable_tier(&subtotal) else {
            return Ok(None);
        };

        let percent = tier.discount_percent();
        let points = percent_points(&percent);
        if points <= Decimal::ZERO {
            return Ok(None);
        }

        let off = percent_of_minor(&percent, Decimal::from(subtotal.to_minor_units()))?;
        let amount = off.checked_neg().ok_or(DiscountError::AmountOverflow)?;

        Ok(Some(Discount::new(
            representative.clone(),
            format!("{} Member - {}% off", tier.name(), points),
            Money::from_minor(amount, subtotal.currency()),
        )))
    }
}
