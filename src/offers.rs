//! Per-product promotional offers
//!
//! An offer pairs an [`OfferKind`] with one argument; the matching
//! [`OfferStrategy`] turns a cart line's quantity and unit price into at most
//! one discount. The [`OfferRegistry`] maps kinds to strategies and is open
//! for extension: callers may mint new kinds and register strategies for
//! them, and a later registration for an existing kind wins.

use std::{borrow::Cow, fmt};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    discounts::{Discount, DiscountError, percent_of_minor, percent_points},
    products::Product,
};

/// Errors raised while configuring or evaluating offers.
#[derive(Debug, Error)]
pub enum OfferError {
    /// No strategy registered for the requested kind. A configuration
    /// mistake, surfaced immediately and never retried.
    #[error("no strategy registered for offer kind `{0}`")]
    UnregisteredKind(OfferKind),

    /// The offer's argument does not match what its strategy expects.
    #[error("offer kind `{kind}` expects {expected} as its argument")]
    ArgumentMismatch {
        /// Kind whose argument was rejected.
        kind: OfferKind,

        /// What the strategy expected, e.g. `"a fixed amount"`.
        expected: &'static str,
    },

    /// Wrapped discount arithmetic error.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Identifier an offer strategy is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OfferKind(Cow<'static, str>);

impl OfferKind {
    /// Buy three, pay for two.
    pub const THREE_FOR_TWO: OfferKind = OfferKind(Cow::Borrowed("three-for-two"));

    /// Buy two for a fixed amount.
    pub const TWO_FOR_AMOUNT: OfferKind = OfferKind(Cow::Borrowed("two-for-amount"));

    /// Buy five for a fixed amount.
    pub const FIVE_FOR_AMOUNT: OfferKind = OfferKind(Cow::Borrowed("five-for-amount"));

    /// Percentage off the whole line.
    pub const PERCENTAGE_DISCOUNT: OfferKind = OfferKind(Cow::Borrowed("percentage-discount"));

    /// Mint a new kind identifier for a custom strategy.
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    /// Return the identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OfferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The single offer argument; its meaning depends on the offer kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfferArgument<'a> {
    /// The kind takes no argument.
    None,

    /// A fixed charge, e.g. the bundle price of a "two for" offer.
    Amount(Money<'a, Currency>),

    /// A fractional percentage, e.g. `0.1` for 10% off.
    Percent(Percentage),
}

/// A per-product promotional offer: a kind plus its argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer<'a> {
    kind: OfferKind,
    argument: OfferArgument<'a>,
}

impl<'a> Offer<'a> {
    /// Create an offer from a kind and argument.
    pub fn new(kind: OfferKind, argument: OfferArgument<'a>) -> Self {
        Self { kind, argument }
    }

    /// Buy three, pay for two.
    pub fn three_for_two() -> Self {
        Self::new(OfferKind::THREE_FOR_TWO, OfferArgument::None)
    }

    /// Buy two for a fixed amount.
    pub fn two_for(amount: Money<'a, Currency>) -> Self {
        Self::new(OfferKind::TWO_FOR_AMOUNT, OfferArgument::Amount(amount))
    }

    /// Buy five for a fixed amount.
    pub fn five_for(amount: Money<'a, Currency>) -> Self {
        Self::new(OfferKind::FIVE_FOR_AMOUNT, OfferArgument::Amount(amount))
    }

    /// A percentage off the whole line.
    pub fn percent_off(percent: Percentage) -> Self {
        Self::new(
            OfferKind::PERCENTAGE_DISCOUNT,
            OfferArgument::Percent(percent),
        )
    }

    /// Return the offer kind.
    pub fn kind(&self) -> &OfferKind {
        &self.kind
    }

    /// Return the offer argument.
    pub fn argument(&self) -> &OfferArgument<'a> {
        &self.argument
    }
}

/// Computes a discount for one cart line.
///
/// Implementations return `Ok(None)` when the line does not meet the offer's
/// eligibility; a non-match is normal control flow, never an error.
pub trait OfferStrategy: fmt::Debug + Send + Sync {
    /// Short human label for the offer family, e.g. `"3 for 2"`.
    fn label(&self) -> &str;

    /// Compute the discount for a line, if the offer applies.
    ///
    /// Only the integer part of `quantity` participates in "for N" grouping;
    /// any fractional remainder is charged at full price.
    ///
    /// # Errors
    ///
    /// Returns an [`OfferError`] for configuration mistakes (a mismatched
    /// argument) or unrepresentable arithmetic.
    fn discount<'a>(
        &self,
        product: &Product,
        quantity: Decimal,
        unit_price: Money<'a, Currency>,
        argument: &OfferArgument<'a>,
    ) -> Result<Option<Discount<'a>>, OfferError>;
}

/// Integer count of qualifying units; the fractional remainder never joins a
/// grouping set.
fn whole_units(quantity: Decimal) -> i64 {
    quantity.trunc().to_i64().unwrap_or(0)
}

fn checked_mul(a: i64, b: i64) -> Result<i64, DiscountError> {
    a.checked_mul(b).ok_or(DiscountError::AmountOverflow)
}

fn checked_add(a: i64, b: i64) -> Result<i64, DiscountError> {
    a.checked_add(b).ok_or(DiscountError::AmountOverflow)
}

/// Discount produced by charging `charged` minor units for `n` units that
/// are worth `n * unit` at full price. Negative when the offer saves money.
fn grouped_discount_minor(n: i64, unit_minor: i64, charged: i64) -> Result<i64, DiscountError> {
    let full = checked_mul(n, unit_minor)?;

    charged.checked_sub(full).ok_or(DiscountError::AmountOverflow)
}

/// Buy three, pay for two. Eligible from three whole units.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeForTwo;

impl OfferStrategy for ThreeForTwo {
    fn label(&self) -> &str {
        "3 for 2"
    }

    fn discount<'a>(
        &self,
        product: &Product,
        quantity: Decimal,
        unit_price: Money<'a, Currency>,
        _argument: &OfferArgument<'a>,
    ) -> Result<Option<Discount<'a>>, OfferError> {
        let n = whole_units(quantity);
        if n <= 2 {
            return Ok(None);
        }

        let unit_minor = unit_price.to_minor_units();
        let sets = n / 3;
        let remainder = n % 3;

        let charged = checked_add(
            checked_mul(checked_mul(sets, 2)?, unit_minor)?,
            checked_mul(remainder, unit_minor)?,
        )?;

        let amount = grouped_discount_minor(n, unit_minor, charged)?;

        Ok(Some(Discount::new(
            product.clone(),
            "3 for 2",
            Money::from_minor(amount, unit_price.currency()),
        )))
    }
}

/// Shared math for "N for a fixed amount" offers.
fn amount_grouped_discount<'a>(
    kind: OfferKind,
    group_size: i64,
    product: &Product,
    quantity: Decimal,
    unit_price: Money<'a, Currency>,
    argument: &OfferArgument<'a>,
) -> Result<Option<Discount<'a>>, OfferError> {
    let OfferArgument::Amount(amount) = argument else {
        return Err(OfferError::ArgumentMismatch {
            kind,
            expected: "a fixed amount",
        });
    };

    if amount.currency() != unit_price.currency() {
        return Err(OfferError::Discount(DiscountError::CurrencyMismatch {
            expected: unit_price.currency().iso_alpha_code,
            actual: amount.currency().iso_alpha_code,
        }));
    }

    let n = whole_units(quantity);
    if n < group_size {
        return Ok(None);
    }

    let unit_minor = unit_price.to_minor_units();
    let sets = n / group_size;
    let remainder = n % group_size;

    let charged = checked_add(
        checked_mul(sets, amount.to_minor_units())?,
        checked_mul(remainder, unit_minor)?,
    )?;

    let discount_minor = grouped_discount_minor(n, unit_minor, charged)?;

    Ok(Some(Discount::new(
        product.clone(),
        format!("{group_size} for {amount}"),
        Money::from_minor(discount_minor, unit_price.currency()),
    )))
}

/// Buy two for a fixed amount. Eligible from two whole units.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoForAmount;

impl OfferStrategy for TwoForAmount {
    fn label(&self) -> &str {
        "2 for amount"
    }

    fn discount<'a>(
        &self,
        product: &Product,
        quantity: Decimal,
        unit_price: Money<'a, Currency>,
        argument: &OfferArgument<'a>,
    ) -> Result<Option<Discount<'a>>, OfferError> {
        amount_grouped_discount(
            OfferKind::TWO_FOR_AMOUNT,
            2,
            product,
            quantity,
            unit_price,
            argument,
        )
    }
}

/// Buy five for a fixed amount. Eligible from five whole units.
#[derive(Debug, Clone, Copy, Default)]
pub struct FiveForAmount;

impl OfferStrategy for FiveForAmount {
    fn label(&self) -> &str {
        "5 for amount"
    }

    fn discount<'a>(
        &self,
        product: &Product,
        quantity: Decimal,
        unit_price: Money<'a, Currency>,
        argument: &OfferArgument<'a>,
    ) -> Result<Option<Discount<'a>>, OfferError> {
        amount_grouped_discount(
            OfferKind::FIVE_FOR_AMOUNT,
            5,
            product,
            quantity,
            unit_price,
            argument,
        )
    }
}

/// Percentage off the whole line. Always eligible and linear in the exact,
/// non-truncated quantity.
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentageDiscount;

impl OfferStrategy for PercentageDiscount {
    fn label(&self) -> &str {
        "percentage discount"
    }

    fn discount<'a>(
        &self,
        product: &Product,
        quantity: Decimal,
        unit_price: Money<'a, Currency>,
        argument: &OfferArgument<'a>,
    ) -> Result<Option<Discount<'a>>, OfferError> {
        let OfferArgument::Percent(percent) = argument else {
            return Err(OfferError::ArgumentMismatch {
                kind: OfferKind::PERCENTAGE_DISCOUNT,
                expected: "a percentage",
            });
        };

        let line_minor = quantity
            .checked_mul(Decimal::from(unit_price.to_minor_units()))
            .ok_or(DiscountError::AmountOverflow)?;

        let off = percent_of_minor(percent, line_minor)?;
        let amount = off.checked_neg().ok_or(DiscountError::AmountOverflow)?;

        Ok(Some(Discount::new(
            product.clone(),
            format!("{}% off", percent_points(percent)),
            Money::from_minor(amount, unit_price.currency()),
        )))
    }
}

/// Maps offer kinds to strategies.
///
/// `Default` pre-populates the four stock kinds; [`register`] replaces or
/// adds, so later registrations win.
///
/// [`register`]: OfferRegistry::register
#[derive(Debug)]
pub struct OfferRegistry {
    strategies: FxHashMap<OfferKind, Box<dyn OfferStrategy>>,
}

impl Default for OfferRegistry {
    fn default() -> Self {
        let mut registry = Self {
            strategies: FxHashMap::default(),
        };

        registry.register(OfferKind::THREE_FOR_TWO, Box::new(ThreeForTwo));
        registry.register(OfferKind::TWO_FOR_AMOUNT, Box::new(TwoForAmount));
        registry.register(OfferKind::FIVE_FOR_AMOUNT, Box::new(FiveForAmount));
        registry.register(OfferKind::PERCENTAGE_DISCOUNT, Box::new(PercentageDiscount));

        registry
    }
}

impl OfferRegistry {
    /// Register a strategy for a kind, replacing any previous registration.
    pub fn register(&mut self, kind: OfferKind, strategy: Box<dyn OfferStrategy>) {
        self.strategies.insert(kind, strategy);
    }

    /// Look up the strategy for a kind.
    ///
    /// # Errors
    ///
    /// Returns [`OfferError::UnregisteredKind`] when no strategy is
    /// registered; a fatal configuration mistake.
    pub fn strategy(&self, kind: &OfferKind) -> Result<&dyn OfferStrategy, OfferError> {
        self.strategies
            .get(kind)
            .map(Box::as_ref)
            .ok_or_else(|| OfferError::UnregisteredKind(kind.clone()))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::products::ProductUnit;

    use super::*;

    fn toothbrush() -> Product {
        Product::new("toothbrush", ProductUnit::Each)
    }

    fn apples() -> Product {
        Product::new("apples", ProductUnit::Kilo)
    }

    #[test]
    fn three_for_two_is_ineligible_below_three_units() -> TestResult {
        for n in [0, 1, 2] {
            let discount = ThreeForTwo.discount(
                &toothbrush(),
                Decimal::from(n),
                Money::from_minor(100, iso::GBP),
                &OfferArgument::None,
            )?;

            assert_eq!(discount, None, "no discount expected for {n} units");
        }

        Ok(())
    }

    #[test]
    fn three_for_two_discounts_one_unit_per_set() -> TestResult {
        let Some(discount) = ThreeForTwo
            .discount(
                &toothbrush(),
                Decimal::from(3),
                Money::from_minor(100, iso::GBP),
                &OfferArgument::None,
            )?
        else {
            panic!("expected a discount")
        };

        assert_eq!(discount.description(), "3 for 2");
        assert_eq!(discount.amount(), Money::from_minor(-100, iso::GBP));

        Ok(())
    }

    #[test]
    fn three_for_two_charges_remainder_at_full_price() -> TestResult {
        // 7 units: two sets of three pay for four, one remainder pays full.
        let Some(discount) = ThreeForTwo
            .discount(
                &toothbrush(),
                Decimal::from(7),
                Money::from_minor(100, iso::GBP),
                &OfferArgument::None,
            )?
        else {
            panic!("expected a discount")
        };

        assert_eq!(discount.amount(), Money::from_minor(-200, iso::GBP));

        Ok(())
    }

    #[test]
    fn three_for_two_ignores_the_fractional_remainder() -> TestResult {
        // 3.5 units group as N = 3; the half unit is charged at full price
        // and does not deepen the discount.
        let Some(discount) = ThreeForTwo
            .discount(
                &apples(),
                Decimal::new(35, 1),
                Money::from_minor(100, iso::GBP),
                &OfferArgument::None,
            )?
        else {
            panic!("expected a discount")
        };

        assert_eq!(discount.amount(), Money::from_minor(-100, iso::GBP));

        Ok(())
    }

    #[test]
    fn two_for_amount_charges_the_set_price() -> TestResult {
        let Some(discount) = TwoForAmount
            .discount(
                &toothbrush(),
                Decimal::from(2),
                Money::from_minor(200, iso::GBP),
                &OfferArgument::Amount(Money::from_minor(300, iso::GBP)),
            )?
        else {
            panic!("expected a discount")
        };

        assert_eq!(discount.description(), "2 for £3.00");
        assert_eq!(discount.amount(), Money::from_minor(-100, iso::GBP));

        Ok(())
    }

    #[test]
    fn two_for_amount_is_ineligible_below_two_units() -> TestResult {
        let discount = TwoForAmount.discount(
            &toothbrush(),
            Decimal::ONE,
            Money::from_minor(200, iso::GBP),
            &OfferArgument::Amount(Money::from_minor(300, iso::GBP)),
        )?;

        assert_eq!(discount, None);

        Ok(())
    }

    #[test]
    fn two_for_amount_odd_unit_pays_full_price() -> TestResult {
        // 5 units at 2.00 with "2 for 3.00": two sets at 3.00 plus one unit
        // at 2.00 charges 8.00 against 10.00 full price.
        let Some(discount) = TwoForAmount
            .discount(
                &toothbrush(),
                Decimal::from(5),
                Money::from_minor(200, iso::GBP),
                &OfferArgument::Amount(Money::from_minor(300, iso::GBP)),
            )?
        else {
            panic!("expected a discount")
        };

        assert_eq!(discount.amount(), Money::from_minor(-200, iso::GBP));

        Ok(())
    }

    #[test]
    fn two_for_amount_rejects_a_percent_argument() {
        let result = TwoForAmount.discount(
            &toothbrush(),
            Decimal::from(2),
            Money::from_minor(200, iso::GBP),
            &OfferArgument::Percent(Percentage::from(0.1)),
        );

        assert!(matches!(
            result,
            Err(OfferError::ArgumentMismatch { .. })
        ));
    }

    #[test]
    fn two_for_amount_rejects_a_foreign_currency_amount() {
        let result = TwoForAmount.discount(
            &toothbrush(),
            Decimal::from(2),
            Money::from_minor(200, iso::GBP),
            &OfferArgument::Amount(Money::from_minor(300, iso::USD)),
        );

        assert!(matches!(
            result,
            Err(OfferError::Discount(DiscountError::CurrencyMismatch { .. }))
        ));
    }

    #[test]
    fn five_for_amount_is_ineligible_below_five_units() -> TestResult {
        let discount = FiveForAmount.discount(
            &toothbrush(),
            Decimal::from(4),
            Money::from_minor(100, iso::GBP),
            &OfferArgument::Amount(Money::from_minor(400, iso::GBP)),
        )?;

        assert_eq!(discount, None);

        Ok(())
    }

    #[test]
    fn five_for_amount_charges_the_set_price() -> TestResult {
        let Some(discount) = FiveForAmount
            .discount(
                &toothbrush(),
                Decimal::from(6),
                Money::from_minor(100, iso::GBP),
                &OfferArgument::Amount(Money::from_minor(400, iso::GBP)),
            )?
        else {
            panic!("expected a discount")
        };

        // One set of five for 4.00 plus one full-price unit: 5.00 charged
        // against 6.00 full price.
        assert_eq!(discount.description(), "5 for £4.00");
        assert_eq!(discount.amount(), Money::from_minor(-100, iso::GBP));

        Ok(())
    }

    #[test]
    fn percentage_discount_is_linear_in_quantity() -> TestResult {
        let unit = Money::from_minor(200, iso::GBP);
        let pct = OfferArgument::Percent(Percentage::from(0.10));

        let Some(one) = PercentageDiscount
            .discount(&apples(), Decimal::ONE, unit, &pct)?
        else {
            panic!("expected a discount")
        };
        let Some(ten) = PercentageDiscount
            .discount(&apples(), Decimal::from(10), unit, &pct)?
        else {
            panic!("expected a discount")
        };

        assert_eq!(one.amount(), Money::from_minor(-20, iso::GBP));
        assert_eq!(ten.amount(), Money::from_minor(-200, iso::GBP));

        Ok(())
    }

    #[test]
    fn percentage_discount_uses_the_exact_fractional_quantity() -> TestResult {
        // 2.5 kg at 2.00 with 10% off discounts 0.50, not 0.40.
        let Some(discount) = PercentageDiscount
            .discount(
                &apples(),
                Decimal::new(25, 1),
                Money::from_minor(200, iso::GBP),
                &OfferArgument::Percent(Percentage::from(0.10)),
            )?
        else {
            panic!("expected a discount")
        };

        assert_eq!(discount.description(), "10% off");
        assert_eq!(discount.amount(), Money::from_minor(-50, iso::GBP));

        Ok(())
    }

    #[test]
    fn percentage_discount_rejects_an_amount_argument() {
        let result = PercentageDiscount.discount(
            &apples(),
            Decimal::ONE,
            Money::from_minor(200, iso::GBP),
            &OfferArgument::Amount(Money::from_minor(50, iso::GBP)),
        );

        assert!(matches!(
            result,
            Err(OfferError::ArgumentMismatch { .. })
        ));
    }

    #[test]
    fn registry_resolves_the_stock_kinds() -> TestResult {
        let registry = OfferRegistry::default();

        for kind in [
            OfferKind::THREE_FOR_TWO,
            OfferKind::TWO_FOR_AMOUNT,
            OfferKind::FIVE_FOR_AMOUNT,
            OfferKind::PERCENTAGE_DISCOUNT,
        ] {
            let _strategy = registry.strategy(&kind)?;
        }

        Ok(())
    }

    #[test]
    fn registry_rejects_an_unregistered_kind() {
        let registry = OfferRegistry::default();
        let kind = OfferKind::new("buy-one-get-one");

        assert!(matches!(
            registry.strategy(&kind),
            Err(OfferError::UnregisteredKind(k)) if k == kind
        ));
    }

    #[derive(Debug)]
    struct FlatDiscount;

    impl OfferStrategy for FlatDiscount {
        fn label(&self) -> &str {
            "flat discount"
        }

        fn discount<'a>(
            &self,
            product: &Product,
            _quantity: Decimal,
            unit_price: Money<'a, Currency>,
            _argument: &OfferArgument<'a>,
        ) -> Result<Option<Discount<'a>>, OfferError> {
            Ok(Some(Discount::new(
                product.clone(),
                "flat 1.00 off",
                Money::from_minor(-100, unit_price.currency()),
            )))
        }
    }

    #[test]
    fn registry_accepts_custom_kinds_and_replacements() -> TestResult {
        let mut registry = OfferRegistry::default();
        let custom = OfferKind::new("flat-discount");

        registry.register(custom.clone(), Box::new(FlatDiscount));
        // A re-registration for an existing kind wins.
        registry.register(OfferKind::THREE_FOR_TWO, Box::new(FlatDiscount));

        assert_eq!(registry.strategy(&custom)?.label(), "flat discount");
        assert_eq!(
            registry.strategy(&OfferKind::THREE_FOR_TWO)?.label(),
            "flat discount"
        );

        Ok(())
    }
}
