//! Products

use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use crate::categories::{ProductCategory, StandardCategory};

/// Unit a product is sold by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductUnit {
    /// Discrete items, counted per piece.
    Each,

    /// Continuous items, weighed in kilograms. Quantities may be fractional.
    Kilo,
}

/// A product identity: name and unit of sale.
///
/// Two products are equal iff their name and unit match; the attached
/// category never participates in equality or hashing.
#[derive(Debug, Clone)]
pub struct Product {
    name: String,
    unit: ProductUnit,
    category: Arc<dyn ProductCategory>,
}

impl Product {
    /// Create a new product with the default [`StandardCategory`].
    pub fn new(name: impl Into<String>, unit: ProductUnit) -> Self {
        Self::with_category(name, unit, Arc::new(StandardCategory))
    }

    /// Create a new product with an explicit category.
    pub fn with_category(
        name: impl Into<String>,
        unit: ProductUnit,
        category: Arc<dyn ProductCategory>,
    ) -> Self {
        Self {
            name: name.into(),
            unit,
            category,
        }
    }

    /// Return the product name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the unit the product is sold by.
    pub fn unit(&self) -> ProductUnit {
        self.unit
    }

    /// Return the attached category.
    pub fn category(&self) -> &Arc<dyn ProductCategory> {
        &self.category
    }

    /// Replace the attached category.
    pub fn set_category(&mut self, category: Arc<dyn ProductCategory>) {
        self.category = category;
    }
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.unit == other.unit
    }
}

impl Eq for Product {}

impl Hash for Product {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.unit.hash(state);
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
