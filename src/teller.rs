//! Checkout orchestrator
//!
//! The [`Teller`] owns the pricing configuration (offers, bundles, loyalty)
//! and composes the three discount mechanisms over a cart and catalog into a
//! receipt. Configuration methods take `&mut self` and [`checkout`] takes
//! `&self`, so the borrow checker enforces the load-config-then-serve
//! discipline: registration cannot race a checkout in safe code.
//!
//! [`checkout`]: Teller::checkout

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    bundles::{BundleRule, BundleSet},
    cart::Cart,
    catalog::Catalog,
    discounts::DiscountError,
    loyalty::LoyaltyProgram,
    offers::{Offer, OfferError, OfferKind, OfferRegistry, OfferStrategy},
    pricing::line_total,
    products::Product,
    receipt::{Receipt, ReceiptLine},
};

/// Errors that abort a checkout.
///
/// Only configuration and lookup mistakes abort; an offer that does not
/// apply, an incomplete bundle, or a 0% loyalty tier simply omit their
/// discount line.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A cart or bundle product has no catalog price.
    #[error("product `{0}` is not in the catalog")]
    UnknownProduct(String),

    /// A catalog price is not in the register's currency.
    #[error("price for `{product}` is in {actual}, but the register currency is {expected}")]
    CurrencyMismatch {
        /// Product whose price was rejected.
        product: String,

        /// Register currency ISO code.
        expected: &'static str,

        /// Offending price's ISO code.
        actual: &'static str,
    },

    /// Wrapped offer configuration or evaluation error.
    #[error(transparent)]
    Offer(#[from] OfferError),

    /// Wrapped discount arithmetic error.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// The checkout register: prices carts against a catalog and applies offers,
/// bundles and loyalty in that order.
#[derive(Debug)]
pub struct Teller<'a, C> {
    catalog: &'a C,
    currency: &'static Currency,
    offers: FxHashMap<Product, Offer<'a>>,
    registry: OfferRegistry,
    bundles: BundleSet,
    loyalty: LoyaltyProgram<'a>,
    loyalty_enabled: bool,
}

impl<'a, C: Catalog> Teller<'a, C> {
    /// Create a teller over a catalog, priced in the given currency, with the
    /// stock offer strategies and default loyalty tiers. Loyalty starts
    /// disabled.
    pub fn new(catalog: &'a C, currency: &'static Currency) -> Self {
        Self {
            catalog,
            currency,
            offers: FxHashMap::default(),
            registry: OfferRegistry::default(),
            bundles: BundleSet::new(),
            loyalty: LoyaltyProgram::with_default_tiers(currency),
            loyalty_enabled: false,
        }
    }

    /// Attach an offer to a product. A product carries at most one offer;
    /// registering again for the same product replaces the earlier offer.
    pub fn add_offer(&mut self, product: Product, offer: Offer<'a>) {
        self.offers.insert(product, offer);
    }

    /// Register (or replace) an offer strategy under a kind.
    pub fn register_strategy(&mut self, kind: OfferKind, strategy: Box<dyn OfferStrategy>) {
        self.registry.register(kind, strategy);
    }

    /// Register a bundle rule.
    pub fn add_bundle(&mut self, rule: BundleRule) {
        self.bundles.add_rule(rule);
    }

    /// Replace the loyalty program wholesale, e.g. to put custom tiers ahead
    /// of the defaults.
    pub fn set_loyalty_program(&mut self, program: LoyaltyProgram<'a>) {
        self.loyalty = program;
    }

    /// Mutable access to the loyalty program, for registering extra tiers.
    pub fn loyalty_mut(&mut self) -> &mut LoyaltyProgram<'a> {
        &mut self.loyalty
    }

    /// Enable the loyalty discount step.
    pub fn enable_loyalty(&mut self) {
        self.loyalty_enabled = true;
    }

    /// Disable the loyalty discount step.
    pub fn disable_loyalty(&mut self) {
        self.loyalty_enabled = false;
    }

    /// Return the register currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Price the cart and compose all applicable discounts into a receipt.
    ///
    /// Steps, strictly in order: price every cart line from the catalog,
    /// apply per-product offers line by line, apply bundle discounts, then at
    /// most one loyalty discount. An empty cart checks out successfully to an
    /// empty receipt.
    ///
    /// The loyalty subtotal is the raw sum of the priced lines, before offer
    /// and bundle discounts. That mirrors the long-standing register
    /// behaviour and means earlier discounts never demote a customer's tier.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::UnknownProduct`] for a cart line with no
    /// catalog price, [`CheckoutError::CurrencyMismatch`] for a price in the
    /// wrong currency, or [`OfferError::UnregisteredKind`] for an offer whose
    /// kind has no registered strategy.
    pub fn checkout(&self, cart: &Cart) -> Result<Receipt<'a>, CheckoutError> {
        let mut receipt = Receipt::new(self.currency);

        for line in cart.lines() {
            let unit_price = self.resolve_price(line.product())?;
            let total = line_total(line.quantity(), &unit_price)?;

            receipt.add_line(ReceiptLine::new(
                line.product().clone(),
                line.quantity(),
                unit_price,
                total,
            ));
        }

        let mut offer_discounts = Vec::new();
        for line in receipt.lines() {
            let Some(offer) = self.offers.get(line.product()) else {
                continue;
            };

            let strategy = self.registry.strategy(offer.kind())?;

            if let Some(discount) = strategy.discount(
                line.product(),
                line.quantity(),
                line.unit_price(),
                offer.argument(),
            )? {
                offer_discounts.push(discount);
            }
        }
        for discount in offer_discounts {
            receipt.add_discount(discount);
        }

        for discount in self
            .bundles
            .discounts(cart, self.catalog, self.currency)?
        {
            receipt.add_discount(discount);
        }

        if self.loyalty_enabled && !receipt.is_empty() {
            let subtotal = receipt.subtotal();

            if let Some(first) = receipt.lines().first() {
                let representative = first.product().clone();

                if let Some(discount) = self.loyalty.discount(subtotal, &representative)? {
                    receipt.add_discount(discount);
                }
            }
        }

        Ok(receipt)
    }

    fn resolve_price(
        &self,
        product: &Product,
    ) -> Result<rusty_money::Money<'a, Currency>, CheckoutError> {
        let price = self
            .catalog
            .unit_price(product)
            .ok_or_else(|| CheckoutError::UnknownProduct(product.name().to_owned()))?;

        if price.currency() != self.currency {
            return Err(CheckoutError::CurrencyMismatch {
                product: product.name().to_owned(),
                expected: self.currency.iso_alpha_code,
                actual: price.currency().iso_alpha_code,
            });
        }

        Ok(price)
    }
}
