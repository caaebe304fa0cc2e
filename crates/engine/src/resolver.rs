//! Selection resolution: buyer selection → the one matching SKU.
//!
//! A SKU matches a selection when its variant set is *exactly* the set of
//! selected variants. Subset containment is not enough: a SKU may carry fewer
//! variants than the product has dimensions (dimensions the seller left
//! unvaried), so only equal sets identify one unit.
//!
//! Outcomes:
//!
//! - `Ok(Some(sku))`: exactly one match.
//! - `Ok(None)`: no SKU has exactly the selected variant set. Expected while
//!   the selection is still partial; a partial selection never resolves to a
//!   "nearest" SKU, only to a SKU whose own set is that partial set.
//! - `Err(IntegrityViolation)`: more than one stored SKU has the selected
//!   variant set. The uniqueness invariant is broken; never auto-resolved.
//!
//! SKUs are indexed by canonical [`VariantKey`], so a lookup is a hash probe
//! instead of a scan over every SKU.

use std::collections::HashMap;

use tracing::error;

use configurator_catalog::{Product, Sku, Variant, VariantKey};
use configurator_core::{DomainError, DomainResult, PropertyId};

use crate::selection::Selection;

/// SKUs of one product, keyed by their variant set.
#[derive(Debug, Clone)]
pub struct SkuIndex<'a> {
    by_key: HashMap<VariantKey, Vec<&'a Sku>>,
}

impl<'a> SkuIndex<'a> {
    /// Index the SKUs belonging to `product` (others are ignored).
    pub fn build(product: &Product, skus: &'a [Sku]) -> Self {
        let mut by_key: HashMap<VariantKey, Vec<&'a Sku>> = HashMap::with_capacity(skus.len());
        for sku in skus.iter().filter(|s| s.product_id == product.id) {
            by_key.entry(sku.variant_ids.clone()).or_default().push(sku);
        }
        Self { by_key }
    }

    /// Number of indexed SKUs.
    pub fn len(&self) -> usize {
        self.by_key.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Variant sets held by more than one SKU.
    pub fn duplicate_keys(&self) -> impl Iterator<Item = &VariantKey> {
        self.by_key
            .iter()
            .filter(|(_, skus)| skus.len() > 1)
            .map(|(key, _)| key)
    }

    /// Exact lookup by variant set.
    pub fn lookup(&self, key: &VariantKey) -> DomainResult<Option<&'a Sku>> {
        match self.by_key.get(key).map(Vec::as_slice) {
            None | Some([]) => Ok(None),
            Some([sku]) => Ok(Some(*sku)),
            Some(many) => {
                let ids: Vec<String> = many.iter().map(|s| s.id.to_string()).collect();
                error!(variant_ids = %key, skus = ?ids, "multiple SKUs share one variant set");
                Err(DomainError::integrity(format!(
                    "{} SKUs ({}) share variant set {key}",
                    many.len(),
                    ids.join(", ")
                )))
            }
        }
    }

    /// Whether some SKU's variant set contains every id of `key`.
    fn any_superset(&self, key: &VariantKey) -> bool {
        self.by_key.keys().any(|k| key.is_subset(k))
    }
}

/// Resolve a selection against a product's SKU set.
///
/// Validates the selection against the product, indexes `skus`, and looks
/// the selection up. Callers resolving repeatedly over the same SKU set
/// should build a [`SkuIndex`] once and use [`resolve_indexed`].
pub fn resolve<'a>(
    product: &Product,
    selection: &Selection,
    skus: &'a [Sku],
) -> DomainResult<Option<&'a Sku>> {
    selection.validate(product)?;
    let index = SkuIndex::build(product, skus);
    resolve_indexed(&index, selection)
}

/// Resolve against a prebuilt index. The selection must already be validated.
///
/// Only the exact variant set is probed. SKU sets extended over several
/// generation runs may mix SKUs of different sizes, so the selection's size
/// says nothing about whether it is complete.
pub fn resolve_indexed<'a>(
    index: &SkuIndex<'a>,
    selection: &Selection,
) -> DomainResult<Option<&'a Sku>> {
    index.lookup(&selection.variant_key())
}

/// Variants of `property_id` that, together with the rest of the selection,
/// still lead to at least one stored SKU.
///
/// The current choice for `property_id` (if any) is ignored, so the result
/// lists every alternative the buyer could switch to.
pub fn available_variants<'p>(
    product: &'p Product,
    index: &SkuIndex<'_>,
    selection: &Selection,
    property_id: PropertyId,
) -> DomainResult<Vec<&'p Variant>> {
    let dimension = product.dimension(&property_id).ok_or_else(|| {
        DomainError::not_found(format!("property {property_id} on product {}", product.id))
    })?;

    let others: Vec<_> = selection
        .iter()
        .filter(|(p, _)| **p != property_id)
        .map(|(_, v)| *v)
        .collect();

    Ok(dimension
        .variants
        .iter()
        .filter(|variant| {
            let key: VariantKey = others.iter().copied().chain([variant.id]).collect();
            index.any_superset(&key)
        })
        .collect())
}
