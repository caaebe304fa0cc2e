//! Variant configuration engine.
//!
//! - [`matrix`]: producer-time generation of every purchasable SKU from a
//!   product's dimensions (Cartesian product, streamed).
//! - [`resolver`]: buyer-time resolution of a [`Selection`] to the single
//!   matching SKU.
//! - [`hotspot`]: binds dimensions to image coordinates and tracks which
//!   dimension the next choice applies to.
//!
//! Storage is reached only through the traits in [`ports`].

pub mod hotspot;
pub mod matrix;
pub mod ports;
pub mod resolver;
pub mod selection;

pub use hotspot::{HotspotBinder, bind};
pub use matrix::{
    Combination, CombinationIter, DimensionSelections, FailedCombination, GenerationReport,
    VariantMatrixGenerator, DEFAULT_MAX_COMBINATIONS,
};
pub use ports::{CatalogRepository, SkuRepository, StoreError};
pub use resolver::{SkuIndex, available_variants, resolve, resolve_indexed};
pub use selection::Selection;
