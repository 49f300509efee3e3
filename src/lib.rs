//! Till
//!
//! Till is a supermarket checkout pricing engine written in Rust. It prices a
//! shopping cart against a catalog and composes three independent discount
//! mechanisms into an itemised receipt: per-product promotional offers,
//! cross-product bundle discounts, and subtotal-based loyalty tiers.

pub mod bundles;
pub mod cart;
pub mod catalog;
pub mod categories;
pub mod discounts;
pub mod fixtures;
pub mod loyalty;
pub mod offers;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod render;
pub mod teller;
