//! Product categories
//!
//! Categories are a pluggable price-adjustment hook attached to products.
//! The checkout pipeline never consults them; the default categories shipped
//! here all charge the plain `base price x quantity`.

use std::fmt;

use rust_decimal::Decimal;

/// A product category with a price-adjustment hook.
pub trait ProductCategory: fmt::Debug + Send + Sync {
    /// Category name for display purposes.
    fn name(&self) -> &str;

    /// Adjust the charge for `quantity` units at `base_price` per unit.
    ///
    /// The default implementation applies no adjustment.
    fn adjust_price(&self, base_price: Decimal, quantity: Decimal) -> Decimal {
        base_price.saturating_mul(quantity)
    }
}

/// Standard category with no special rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCategory;

impl ProductCategory for StandardCategory {
    fn name(&self) -> &str {
        "Standard"
    }
}

/// Premium category for high-quality items.
#[derive(Debug, Clone, Copy, Default)]
pub struct PremiumCategory;

impl ProductCategory for PremiumCategory {
    fn name(&self) -> &str {
        "Premium"
    }
}

/// Conjured category. The degradation multiplier affects quality tracking in
/// store systems, not the charged price.
#[derive(Debug, Clone, Copy)]
pub struct ConjuredCategory {
    degradation_multiplier: Decimal,
}

impl ConjuredCategory {
    /// Create a conjured category with the conventional double degradation.
    pub fn new() -> Self {
        Self {
            degradation_multiplier: Decimal::TWO,
        }
    }

    /// Return the quality degradation multiplier.
    pub fn degradation_multiplier(&self) -> Decimal {
        self.degradation_multiplier
    }
}

impl Default for ConjuredCategory {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductCategory for ConjuredCategory {
    fn name(&self) -> &str {
        "Conjured"
    }
}
