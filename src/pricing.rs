//! Pricing

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};

use crate::discounts::DiscountError;

/// Calculate the charge for `quantity` units at `unit_price` each.
///
/// The product is computed in minor units with decimal intermediates and
/// rounded midpoint-away-from-zero to a whole number of minor units, so
/// fractional weight quantities price deterministically.
///
/// # Errors
///
/// Returns [`DiscountError::AmountOverflow`] if the multiplication cannot be
/// represented.
pub fn line_total<'a>(
    quantity: Decimal,
    unit_price: &Money<'a, Currency>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let raw = quantity
        .checked_mul(Decimal::from(unit_price.to_minor_units()))
        .ok_or(DiscountError::AmountOverflow)?;

    let rounded = raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let minor = rounded.to_i64().ok_or(DiscountError::AmountOverflow)?;

    Ok(Money::from_minor(minor, unit_price.currency()))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn whole_quantities_multiply_exactly() -> TestResult {
        let total = line_total(Decimal::from(3), &Money::from_minor(199, iso::GBP))?;

        assert_eq!(total, Money::from_minor(597, iso::GBP));

        Ok(())
    }

    #[test]
    fn fractional_weight_rounds_to_minor_units() -> TestResult {
        // 2.5 kg at £1.99/kg is £4.975, which rounds to £4.98.
        let total = line_total(Decimal::new(25, 1), &Money::from_minor(199, iso::GBP))?;

        assert_eq!(total, Money::from_minor(498, iso::GBP));

        Ok(())
    }

    #[test]
    fn zero_quantity_prices_to_zero() -> TestResult {
        let total = line_total(Decimal::ZERO, &Money::from_minor(199, iso::GBP))?;

        assert_eq!(total, Money::from_minor(0, iso::GBP));

        Ok(())
    }

    #[test]
    fn unrepresentable_products_error() {
        let result = line_total(Decimal::MAX, &Money::from_minor(i64::MAX, iso::GBP));

        assert!(matches!(result, Err(DiscountError::AmountOverflow)));
    }
}
