//! Cross-product bundle discounts
//!
//! A bundle rule names a group of products and a percentage. The rule fires
//! when every member is present in the cart, whatever the quantities, and the
//! discount is computed from one catalog unit price per member.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};

use crate::{
    cart::Cart,
    catalog::Catalog,
    discounts::{Discount, DiscountError, percent_of_minor, percent_points},
    products::Product,
    teller::CheckoutError,
};

/// A named group of products discounted for joint presence in a cart.
#[derive(Debug, Clone)]
pub struct BundleRule {
    name: String,
    products: Vec<Product>,
    percent: Percentage,
}

impl BundleRule {
    /// Create a new bundle rule.
    pub fn new(name: impl Into<String>, products: Vec<Product>, percent: Percentage) -> Self {
        Self {
            name: name.into(),
            products,
            percent,
        }
    }

    /// Return the bundle name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member products, in display order. The first member is the discount's
    /// representative product.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Return the discount percentage.
    pub fn percent(&self) -> Percentage {
        self.percent
    }

    /// Receipt description for this bundle.
    pub fn description(&self) -> String {
        format!(
            "{} bundle - {}% off",
            self.name,
            percent_points(&self.percent)
        )
    }

    /// Whether every member is present in the given product set. Presence is
    /// all that counts; quantities are irrelevant.
    pub fn is_applicable(&self, cart_products: &FxHashSet<&Product>) -> bool {
        self.products.iter().all(|p| cart_products.contains(p))
    }
}

/// The ordered list of registered bundle rules.
#[derive(Debug, Default)]
pub struct BundleSet {
    rules: Vec<BundleRule>,
}

impl BundleSet {
    /// Create an empty bundle set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule. Rules are evaluated in registration order.
    pub fn add_rule(&mut self, rule: BundleRule) {
        self.rules.push(rule);
    }

    /// Registered rules.
    pub fn rules(&self) -> &[BundleRule] {
        &self.rules
    }

    /// Evaluate every rule against the cart and emit one discount per
    /// applicable rule, in registration order.
    ///
    /// The amount is the bundle percentage of the summed catalog unit prices
    /// of the members; quantities actually purchased never enter into it, and
    /// no rule fires more than once. A rule with no members is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::UnknownProduct`] if a member of an applicable
    /// rule has no catalog price, or an arithmetic error if the discount is
    /// unrepresentable.
    pub fn discounts<'a>(
        &self,
        cart: &Cart,
        catalog: &'a impl Catalog,
        currency: &'static Currency,
    ) -> Result<Vec<Discount<'a>>, CheckoutError> {
        let cart_products: FxHashSet<&Product> = cart.products().collect();
        let mut discounts = Vec::new();

        for rule in &self.rules {
            let Some(representative) = rule.products().first() else {
                continue;
            };

            if !rule.is_applicable(&cart_products) {
                continue;
            }

            let mut bundle_minor = 0i64;
            for member in rule.products() {
                let price = catalog
                    .unit_price(member)
                    .ok_or_else(|| CheckoutError::UnknownProduct(member.name().to_owned()))?;

                bundle_minor = bundle_minor
                    .checked_add(price.to_minor_units())
                    .ok_or(DiscountError::AmountOverflow)?;
            }

            let off = percent_of_minor(&rule.percent, Decimal::from(bundle_minor))?;
            let amount = off.checked_neg().ok_or(DiscountError::AmountOverflow)?;

            discounts.push(Discount::new(
                representative.clone(),
                rule.description(),
                Money::from_minor(amount, currency),
            ));
        }

        Ok(discounts)
    }
}
