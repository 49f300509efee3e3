//! Discounts

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::products::Product;

/// Errors raised by discount arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely represented.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Minor-unit arithmetic overflowed.
    #[error("minor unit arithmetic overflowed")]
    AmountOverflow,

    /// An amount's currency differs from the price it is applied to.
    #[error("amount is in {actual}, but the price is in {expected}")]
    CurrencyMismatch {
        /// Currency of the price being discounted.
        expected: &'static str,

        /// Currency of the offending amount.
        actual: &'static str,
    },
}

/// A discount line attached to a receipt.
///
/// The amount is a reduction and is negative for every sensible
/// configuration. The product is only a display reference (the cart line or
/// first bundle member the discount is shown against) and never feeds back
/// into amount computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Discount<'a> {
    product: Product,
    description: String,
    amount: Money<'a, Currency>,
}

impl<'a> Discount<'a> {
    /// Create a new discount line.
    pub fn new(product: Product, description: impl Into<String>, amount: Money<'a, Currency>) -> Self {
        Self {
            product,
            description: description.into(),
            amount,
        }
    }

    /// Representative product the discount is displayed against.
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Human-readable description, e.g. `"3 for 2"`.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Signed amount; negative for a reduction.
    pub fn amount(&self) -> Money<'a, Currency> {
        self.amount
    }
}

/// Apply a fractional percentage to an amount of minor units, rounding
/// midpoints away from zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] when the multiplication
/// overflows or the result does not fit in an `i64`.
pub fn percent_of_minor(percent: &Percentage, minor: Decimal) -> Result<i64, DiscountError> {
    let fraction = *percent * Decimal::ONE;

    let applied = fraction
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?;

    let rounded = applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    rounded.to_i64().ok_or(DiscountError::PercentConversion)
}

/// Convert a fractional percentage to percent points for display, with
/// trailing zeroes stripped (`0.1` becomes `10`).
pub fn percent_points(percent: &Percentage) -> Decimal {
    ((*percent * Decimal::ONE) * Decimal::ONE_HUNDRED).normalize()
}
