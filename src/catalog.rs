//! Catalog

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::products::Product;

/// Errors raised while configuring a catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A price's currency differs from the store currency.
    #[error("price for `{product}` is in {actual}, but the store currency is {expected}")]
    CurrencyMismatch {
        /// Product whose price was rejected.
        product: String,

        /// Store currency ISO code.
        expected: &'static str,

        /// Rejected price's ISO code.
        actual: &'static str,
    },
}

/// Read-only price source consulted during checkout.
pub trait Catalog {
    /// Look up the unit price for a product, or `None` when unknown.
    fn unit_price(&self, product: &Product) -> Option<Money<'_, Currency>>;
}

/// In-memory catalog mapping products to unit prices in one store currency.
#[derive(Debug)]
pub struct MemoryCatalog<'a> {
    prices: FxHashMap<Product, Money<'a, Currency>>,
    currency: &'static Currency,
}

impl<'a> MemoryCatalog<'a> {
    /// Create an empty catalog priced in the given currency.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            prices: FxHashMap::default(),
            currency,
        }
    }

    /// Add or replace a product's unit price.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::CurrencyMismatch`] when the price is not in
    /// the store currency.
    pub fn add_product(
        &mut self,
        product: Product,
        price: Money<'a, Currency>,
    ) -> Result<(), CatalogError> {
        if price.currency() != self.currency {
            return Err(CatalogError::CurrencyMismatch {
                product: product.name().to_owned(),
                expected: self.currency.iso_alpha_code,
                actual: price.currency().iso_alpha_code,
            });
        }

        self.prices.insert(product, price);

        Ok(())
    }

    /// Return the store currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Number of priced products.
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Check whether the catalog has no prices.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl Catalog for MemoryCatalog<'_> {
    fn unit_price(&self, product: &Product) -> Option<Money<'_, Currency>> {
        self.prices.get(product).copied()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::products::ProductUnit;

    use super::*;

    #[test]
    fn unit_price_returns_registered_price() -> TestResult {
        let toothbrush = Product::new("toothbrush", ProductUnit::Each);

        let mut catalog = MemoryCatalog::new(iso::GBP);
        catalog.add_product(toothbrush.clone(), Money::from_minor(99, iso::GBP))?;

        assert_eq!(
            catalog.unit_price(&toothbrush),
            Some(Money::from_minor(99, iso::GBP))
        );

        Ok(())
    }

    #[test]
    fn unit_price_is_none_for_unknown_product() {
        let catalog = MemoryCatalog::new(iso::GBP);
        let apples = Product::new("apples", ProductUnit::Kilo);

        assert_eq!(catalog.unit_price(&apples), None);
    }

    #[test]
    fn add_product_rejects_foreign_currency() {
        let mut catalog = MemoryCatalog::new(iso::GBP);
        let apples = Product::new("apples", ProductUnit::Kilo);

        let result = catalog.add_product(apples, Money::from_minor(199, iso::USD));

        assert_eq!(
            result,
            Err(CatalogError::CurrencyMismatch {
                product: "apples".to_owned(),
                expected: iso::GBP.iso_alpha_code,
                actual: iso::USD.iso_alpha_code,
            })
        );
    }

    #[test]
    fn later_registration_replaces_the_price() -> TestResult {
        let toothbrush = Product::new("toothbrush", ProductUnit::Each);

        let mut catalog = MemoryCatalog::new(iso::GBP);
        catalog.add_product(toothbrush.clone(), Money::from_minor(99, iso::GBP))?;
        catalog.add_product(toothbrush.clone(), Money::from_minor(129, iso::GBP))?;

        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.unit_price(&toothbrush),
            Some(Money::from_minor(129, iso::GBP))
        );

        Ok(())
    }
}
