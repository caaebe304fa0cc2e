//! Data-access ports the engine depends on.
//!
//! The engine never owns a storage client. Callers inject implementations of
//! these traits (in-memory for tests/dev, a database adapter in production).
//!
//! ## Uniqueness
//!
//! `SkuRepository::insert` must enforce a unique index over
//! `(product_id, variant_ids)` atomically. A violation is reported as
//! [`StoreError::Duplicate`], which the generator treats as an expected,
//! per-item outcome. Any other failure is [`StoreError::Unavailable`] and is
//! never confused with a duplicate.

use std::sync::Arc;

use thiserror::Error;

use configurator_catalog::{Hotspot, NewSku, Product, Sku, VariantKey};
use configurator_core::ProductId;

/// Storage operation error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A SKU with the same variant set already exists for the product.
    #[error("combination {0} already exists")]
    Duplicate(VariantKey),

    /// The backing store failed (connectivity, poisoned lock, serialization, ...).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to products, their dimensions and hotspots.
pub trait CatalogRepository: Send + Sync {
    fn product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Explicit hotspots for the product (properties without one are absent).
    fn hotspots(&self, product_id: ProductId) -> Result<Vec<Hotspot>, StoreError>;
}

/// Read/write access to generated SKUs.
pub trait SkuRepository: Send + Sync {
    /// Persist a new SKU, assigning its id and creation time.
    fn insert(&self, sku: NewSku) -> Result<Sku, StoreError>;

    fn list_for_product(&self, product_id: ProductId) -> Result<Vec<Sku>, StoreError>;

    fn count_for_product(&self, product_id: ProductId) -> Result<usize, StoreError> {
        Ok(self.list_for_product(product_id)?.len())
    }
}

impl<S> CatalogRepository for Arc<S>
where
    S: CatalogRepository + ?Sized,
{
    fn product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).product(product_id)
    }

    fn hotspots(&self, product_id: ProductId) -> Result<Vec<Hotspot>, StoreError> {
        (**self).hotspots(product_id)
    }
}

impl<S> SkuRepository for Arc<S>
where
    S: SkuRepository + ?Sized,
{
    fn insert(&self, sku: NewSku) -> Result<Sku, StoreError> {
        (**self).insert(sku)
    }

    fn list_for_product(&self, product_id: ProductId) -> Result<Vec<Sku>, StoreError> {
        (**self).list_for_product(product_id)
    }

    fn count_for_product(&self, product_id: ProductId) -> Result<usize, StoreError> {
        (**self).count_for_product(product_id)
    }
}
