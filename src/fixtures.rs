//! Store fixtures
//!
//! Loads a complete store definition (catalog prices, offers, bundles and
//! the loyalty switch) from a YAML file, and builds a configured [`Teller`]
//! from it.

use std::{fs, path::Path, sync::Arc};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    bundles::BundleRule,
    catalog::MemoryCatalog,
    categories::{ConjuredCategory, PremiumCategory},
    offers::{Offer, OfferArgument, OfferKind},
    products::{Product, ProductUnit},
    teller::Teller,
};

/// Fixture parsing errors.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files.
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format.
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format.
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// An offer or bundle references a product key with no definition.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Currency mismatch between prices in the same store.
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// The store defines no products.
    #[error("No products defined; currency unknown")]
    NoProducts,

    /// Catalog rejected a price.
    #[error(transparent)]
    Catalog(#[from] crate::catalog::CatalogError),
}

/// Wrapper for a whole store in YAML.
#[derive(Debug, Deserialize)]
struct StoreFixture {
    products: FxHashMap<String, ProductFixture>,

    #[serde(default)]
    offers: Vec<OfferFixture>,

    #[serde(default)]
    bundles: Vec<BundleFixture>,

    #[serde(default)]
    loyalty: bool,
}

#[derive(Debug, Deserialize)]
struct ProductFixture {
    name: String,
    unit: UnitFixture,

    /// Price with currency code, e.g. "2.99 GBP".
    price: String,

    #[serde(default)]
    category: Option<CategoryFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum UnitFixture {
    Each,
    Kilo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum CategoryFixture {
    Standard,
    Premium,
    Conjured,
}

#[derive(Debug, Deserialize)]
struct OfferFixture {
    product: String,

    /// Registry kind identifier, e.g. "three-for-two".
    kind: String,

    #[serde(default)]
    amount: Option<String>,

    #[serde(default)]
    percent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BundleFixture {
    name: String,
    products: Vec<String>,
    percent: String,
}

/// A store loaded from a fixture file: a priced catalog plus the discount
/// configuration needed to build a [`Teller`].
#[derive(Debug)]
pub struct Store {
    products: FxHashMap<String, Product>,
    catalog: MemoryCatalog<'static>,
    offers: Vec<(Product, Offer<'static>)>,
    bundles: Vec<BundleRule>,
    loyalty: bool,
}

impl Store {
    /// Load a store from a YAML fixture file.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the file cannot be read or parsed, or
    /// if its definitions are inconsistent.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Parse a store from YAML text.
    ///
    /// All prices must share one currency; the first product's price sets
    /// it. Offers and bundles must reference defined product keys.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if parsing or validation fails.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        let fixture: StoreFixture = serde_norway::from_str(contents)?;

        let mut store_currency: Option<&'static Currency> = None;
        let mut products = FxHashMap::default();
        let mut prices = Vec::new();

        for (key, product_fixture) in fixture.products {
            let (minor_units, currency) = parse_price(&product_fixture.price)?;

            if let Some(existing) = store_currency {
                if existing != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                store_currency = Some(currency);
            }

            let unit = match product_fixture.unit {
                UnitFixture::Each => ProductUnit::Each,
                UnitFixture::Kilo => ProductUnit::Kilo,
            };

            let mut product = Product::new(product_fixture.name, unit);

            match product_fixture.category {
                None | Some(CategoryFixture::Standard) => {}
                Some(CategoryFixture::Premium) => {
                    product.set_category(Arc::new(PremiumCategory));
                }
                Some(CategoryFixture::Conjured) => {
                    product.set_category(Arc::new(ConjuredCategory::new()));
                }
            }

            prices.push((product.clone(), minor_units));
            products.insert(key, product);
        }

        let currency = store_currency.ok_or(FixtureError::NoProducts)?;
        let mut catalog = MemoryCatalog::new(currency);

        for (product, minor_units) in prices {
            catalog.add_product(product, Money::from_minor(minor_units, currency))?;
        }

        let mut offers = Vec::new();
        for offer_fixture in fixture.offers {
            let product = lookup(&products, &offer_fixture.product)?;
            let argument = parse_argument(&offer_fixture, currency)?;

            offers.push((
                product.clone(),
                Offer::new(OfferKind::new(offer_fixture.kind), argument),
            ));
        }

        let mut bundles = Vec::new();
        for bundle_fixture in fixture.bundles {
            let members = bundle_fixture
                .products
                .iter()
                .map(|key| lookup(&products, key).cloned())
                .collect::<Result<Vec<_>, _>>()?;

            bundles.push(BundleRule::new(
                bundle_fixture.name,
                members,
                parse_percentage(&bundle_fixture.percent)?,
            ));
        }

        Ok(Store {
            products,
            catalog,
            offers,
            bundles,
            loyalty: fixture.loyalty,
        })
    }

    /// Get a product by its fixture key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not defined.
    pub fn product(&self, key: &str) -> Result<&Product, FixtureError> {
        lookup(&self.products, key)
    }

    /// The priced catalog.
    #[must_use]
    pub fn catalog(&self) -> &MemoryCatalog<'static> {
        &self.catalog
    }

    /// The store currency.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.catalog.currency()
    }

    /// Build a teller over this store's catalog with its offers, bundles and
    /// loyalty switch applied.
    #[must_use]
    pub fn teller(&self) -> Teller<'_, MemoryCatalog<'static>> {
        let mut teller = Teller::new(&self.catalog, self.currency());

        for (product, offer) in &self.offers {
            teller.add_offer(product.clone(), offer.clone());
        }

        for rule in &self.bundles {
            teller.add_bundle(rule.clone());
        }

        if self.loyalty {
            teller.enable_loyalty();
        }

        teller
    }
}

fn lookup<'m>(
    products: &'m FxHashMap<String, Product>,
    key: &str,
) -> Result<&'m Product, FixtureError> {
    products
        .get(key)
        .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
}

fn parse_argument(
    fixture: &OfferFixture,
    currency: &'static Currency,
) -> Result<OfferArgument<'static>, FixtureError> {
    if let Some(amount) = &fixture.amount {
        let (minor_units, amount_currency) = parse_price(amount)?;

        if amount_currency != currency {
            return Err(FixtureError::CurrencyMismatch(
                currency.iso_alpha_code.to_string(),
                amount_currency.iso_alpha_code.to_string(),
            ));
        }

        return Ok(OfferArgument::Amount(Money::from_minor(
            minor_units,
            currency,
        )));
    }

    if let Some(percent) = &fixture.percent {
        return Ok(OfferArgument::Percent(parse_percentage(percent)?));
    }

    Ok(OfferArgument::None)
}

/// Parse a price string (e.g. "2.99 GBP") into minor units and currency.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a decimal, or if the currency code is unknown.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = iso::find(currency_code)
        .ok_or_else(|| FixtureError::UnknownCurrency((*currency_code).to_string()))?;

    let scale = Decimal::from(10_i64.checked_pow(currency.exponent).unwrap_or(1));

    let minor_units = amount
        .checked_mul(scale)
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Parse a percentage string ("15%" or "0.15") into a fractional
/// [`Percentage`].
///
/// # Errors
///
/// Returns an error if the string is not a decimal in either format.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        let value = percent_str
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value / Decimal::ONE_HUNDRED))
    } else {
        let value = trimmed
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use rust_decimal::Decimal;
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use crate::{cart::Cart, catalog::Catalog};

    use super::*;

    const STORE_YAML: &str = r#"
products:
  toothbrush:
    name: Toothbrush
    unit: each
    price: "0.99 GBP"
  apples:
    name: Apples
    unit: kilo
    price: "1.99 GBP"
  rice:
    name: Rice
    unit: each
    price: "2.49 GBP"

offers:
  - product: toothbrush
    kind: three-for-two
  - product: apples
    kind: percentage-discount
    percent: "20%"

bundles:
  - name: Pantry
    products: [rice, toothbrush]
    percent: "10%"

loyalty: true
"#;

    #[test]
    fn store_loads_products_offers_and_bundles() -> TestResult {
        let store = Store::from_yaml(STORE_YAML)?;

        assert_eq!(store.currency(), GBP);
        assert_eq!(store.catalog().len(), 3);

        let toothbrush = store.product("toothbrush")?;
        let Some(price) = store.catalog().unit_price(toothbrush) else {
            panic!("expected a catalog price");
        };

        assert_eq!(price.to_minor_units(), 99);

        Ok(())
    }

    #[test]
    fn store_teller_applies_the_configured_offers() -> TestResult {
        let store = Store::from_yaml(STORE_YAML)?;
        let teller = store.teller();

        let mut cart = Cart::new();
        cart.add(store.product("toothbrush")?.clone(), Decimal::from(3));

        let receipt = teller.checkout(&cart)?;

        assert_eq!(receipt.discounts().len(), 1);
        assert_eq!(receipt.discounts()[0].description(), "3 for 2");

        Ok(())
    }

    #[test]
    fn store_teller_enables_loyalty_from_the_fixture() -> TestResult {
        let store = Store::from_yaml(STORE_YAML)?;
        let teller = store.teller();

        // 30 x 2.49 = 74.70 qualifies for Gold.
        let mut cart = Cart::new();
        cart.add(store.product("rice")?.clone(), Decimal::from(30));

        let receipt = teller.checkout(&cart)?;

        let loyalty = receipt
            .discounts()
            .iter()
            .find(|d| d.description().contains("Gold"));

        assert!(loyalty.is_some());

        Ok(())
    }

    #[test]
    fn store_attaches_a_declared_category() -> TestResult {
        let yaml = r#"
products:
  rice:
    name: Rice
    unit: each
    price: "2.49 GBP"
    category: premium
"#;

        let store = Store::from_yaml(yaml)?;

        assert_eq!(store.product("rice")?.category().name(), "Premium");

        Ok(())
    }

    #[test]
    fn store_from_path_reads_a_file() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(STORE_YAML.as_bytes())?;

        let store = Store::from_path(file.path())?;

        assert_eq!(store.catalog().len(), 3);

        Ok(())
    }

    #[test]
    fn store_rejects_mixed_currencies() {
        let yaml = r#"
products:
  a:
    name: A
    unit: each
    price: "1.00 GBP"
  b:
    name: B
    unit: each
    price: "1.00 USD"
"#;

        let result = Store::from_yaml(yaml);

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn store_rejects_offers_on_undefined_products() {
        let yaml = r#"
products:
  a:
    name: A
    unit: each
    price: "1.00 GBP"

offers:
  - product: ghost
    kind: three-for-two
"#;

        let result = Store::from_yaml(yaml);

        assert!(matches!(
            result,
            Err(FixtureError::ProductNotFound(key)) if key == "ghost"
        ));
    }

    #[test]
    fn store_with_no_products_is_rejected() {
        let result = Store::from_yaml("products: {}\n");

        assert!(matches!(result, Err(FixtureError::NoProducts)));
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99GBP");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_scales_by_the_currency_exponent() -> TestResult {
        let (minor, currency) = parse_price("2.99 GBP")?;

        assert_eq!(minor, 299);
        assert_eq!(currency, GBP);

        Ok(())
    }

    #[test]
    fn parse_percentage_accepts_both_formats() -> TestResult {
        assert_eq!(parse_percentage("15%")?, Percentage::from(0.15));
        assert_eq!(parse_percentage("0.15")?, Percentage::from(0.15));
        assert_eq!(parse_percentage("  15%  ")?, Percentage::from(0.15));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_invalid_format() {
        let result = parse_percentage("invalid");

        assert!(matches!(result, Err(FixtureError::InvalidPercentage(_))));
    }
}
