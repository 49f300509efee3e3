//! Till prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    bundles::{BundleRule, BundleSet},
    cart::{Cart, CartLine},
    catalog::{Catalog, CatalogError, MemoryCatalog},
    categories::{ConjuredCategory, PremiumCategory, ProductCategory, StandardCategory},
    discounts::{Discount, DiscountError},
    fixtures::{FixtureError, Store},
    loyalty::{LoyaltyProgram, LoyaltyTier, ThresholdTier},
    offers::{Offer, OfferArgument, OfferError, OfferKind, OfferRegistry, OfferStrategy},
    products::{Product, ProductUnit},
    receipt::{Receipt, ReceiptLine},
    render::{RenderError, write_receipt},
    teller::{CheckoutError, Teller},
};
