//! Catalog records for configurable products.
//!
//! This crate contains the data model the configuration engine works on,
//! implemented purely as deterministic domain logic (no IO, no storage):
//! products and their dimensions, variants with price deltas, generated SKUs,
//! image hotspots, and the price calculator.

pub mod hotspot;
pub mod pricing;
pub mod product;
pub mod property;
pub mod sku;

pub use hotspot::{Coordinate, Hotspot};
pub use pricing::{Price, PriceDelta, calculate_price};
pub use product::{Dimension, Product};
pub use property::{Property, Variant};
pub use sku::{NewSku, Sku, VariantKey, sku_code};
