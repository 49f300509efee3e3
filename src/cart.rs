//! Shopping cart

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;

use crate::products::Product;

/// One accumulated cart line: a product and its total quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    product: Product,
    quantity: Decimal,
}

impl CartLine {
    /// Return the product.
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Return the accumulated quantity.
    pub fn quantity(&self) -> Decimal {
        self.quantity
    }
}

/// An ordered cart that merges repeated additions of the same product.
///
/// Lines keep first-add order; adding a product already present sums the
/// quantity into its existing line.
#[derive(Debug, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    index: FxHashMap<Product, usize>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single unit of a product.
    pub fn add_item(&mut self, product: Product) {
        self.add(product, Decimal::ONE);
    }

    /// Add a quantity of a product, merging with any existing line.
    ///
    /// Quantities may be fractional for weight-unit products and are expected
    /// to be non-negative; the cart does not police the sign.
    pub fn add(&mut self, product: Product, quantity: Decimal) {
        if let Some(&idx) = self.index.get(&product) {
            if let Some(line) = self.lines.get_mut(idx) {
                line.quantity = line.quantity.saturating_add(quantity);
            }
        } else {
            self.index.insert(product.clone(), self.lines.len());
            self.lines.push(CartLine { product, quantity });
        }
    }

    /// Ordered cart lines.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Accumulated quantity per product.
    pub fn product_quantities(&self) -> FxHashMap<&Product, Decimal> {
        self.lines
            .iter()
            .map(|line| (&line.product, line.quantity))
            .collect()
    }

    /// Distinct products in the cart, in line order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.lines.iter().map(CartLine::product)
    }

    /// Number of distinct cart lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check whether the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
