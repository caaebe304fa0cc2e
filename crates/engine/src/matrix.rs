//! Variant matrix generation.
//!
//! Producer-time batch that materializes the Cartesian product of the chosen
//! variant lists into SKUs.
//!
//! ## Shape of the product
//!
//! The caller picks, per property, which variants to materialize. An empty
//! list (or a property missing from the request) means the dimension is left
//! unvaried for this run: it contributes `None` to every combination and no
//! variant to any SKU. When every list is empty the run yields exactly one
//! combination, the base configuration.
//!
//! ## Cost
//!
//! The number of combinations is `∏ |listᵢ|`, which grows combinatorially.
//! [`CombinationIter`] walks the product lazily (odometer over per-dimension
//! indices), so peak memory is one combination at a time, and
//! [`VariantMatrixGenerator`] refuses runs above its `max_combinations` guard
//! before persisting anything.
//!
//! ## Idempotence
//!
//! Persisting goes through [`SkuRepository::insert`], whose unique index turns
//! an existing combination into [`StoreError::Duplicate`]. Duplicates are
//! counted as skipped; other store failures are recorded per combination. The
//! batch never aborts halfway, so re-running a generation only fills in what
//! is missing.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use configurator_catalog::{
    NewSku, Product, Sku, Variant, VariantKey, calculate_price, sku_code,
};
use configurator_core::{DomainError, DomainResult, ProductId, PropertyId, VariantId};

use crate::ports::{SkuRepository, StoreError};

/// Default upper bound on combinations per generation run.
pub const DEFAULT_MAX_COMBINATIONS: u64 = 10_000;

/// Caller's choice of variants to materialize, per property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionSelections(BTreeMap<PropertyId, Vec<VariantId>>);

impl DimensionSelections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every declared variant of every property.
    pub fn all_variants(product: &Product) -> Self {
        Self(
            product
                .dimensions
                .iter()
                .map(|d| (d.property.id, d.variants.iter().map(|v| v.id).collect()))
                .collect(),
        )
    }

    pub fn with(mut self, property_id: PropertyId, variant_ids: Vec<VariantId>) -> Self {
        self.0.insert(property_id, variant_ids);
        self
    }

    pub fn insert(&mut self, property_id: PropertyId, variant_ids: Vec<VariantId>) {
        self.0.insert(property_id, variant_ids);
    }

    pub fn get(&self, property_id: &PropertyId) -> Option<&[VariantId]> {
        self.0.get(property_id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropertyId, &Vec<VariantId>)> {
        self.0.iter()
    }

    /// Resolve the requested ids against the product, in dimension order.
    ///
    /// Fails on unknown properties or variants and on a variant listed twice
    /// within one dimension.
    fn axes<'a>(&self, product: &'a Product) -> DomainResult<Vec<Axis<'a>>> {
        for property_id in self.0.keys() {
            if product.dimension(property_id).is_none() {
                return Err(DomainError::not_found(format!(
                    "property {property_id} on product {}",
                    product.id
                )));
            }
        }

        product
            .dimensions
            .iter()
            .map(|dimension| {
                let requested = self.get(&dimension.property.id).unwrap_or(&[]);
                let mut seen = HashSet::with_capacity(requested.len());
                let mut variants = Vec::with_capacity(requested.len());
                for variant_id in requested {
                    if !seen.insert(*variant_id) {
                        return Err(DomainError::validation(format!(
                            "variant {variant_id} listed twice for property {}",
                            dimension.property.name
                        )));
                    }
                    let variant = dimension.variant(variant_id).ok_or_else(|| {
                        DomainError::not_found(format!(
                            "variant {variant_id} on property {}",
                            dimension.property.name
                        ))
                    })?;
                    variants.push(variant);
                }
                Ok(Axis {
                    property_id: dimension.property.id,
                    variants,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
struct Axis<'a> {
    property_id: PropertyId,
    /// Empty: dimension left unvaried in this run.
    variants: Vec<&'a Variant>,
}

/// One element of the matrix: a choice (or deliberate non-choice) per dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination<'a> {
    choices: Vec<(PropertyId, Option<&'a Variant>)>,
}

impl<'a> Combination<'a> {
    pub fn choice(&self, property_id: &PropertyId) -> Option<VariantId> {
        self.choices
            .iter()
            .find(|(p, _)| p == property_id)
            .and_then(|(_, v)| v.map(|v| v.id))
    }

    /// Chosen variants, in dimension order.
    pub fn variants(&self) -> impl Iterator<Item = &'a Variant> + '_ {
        self.choices.iter().filter_map(|(_, v)| *v)
    }

    pub fn key(&self) -> VariantKey {
        self.variants().map(|v| v.id).collect()
    }

    pub fn is_base(&self) -> bool {
        self.choices.iter().all(|(_, v)| v.is_none())
    }
}

/// Lazy Cartesian product over the requested variant lists.
#[derive(Debug, Clone)]
pub struct CombinationIter<'a> {
    axes: Vec<Axis<'a>>,
    cursor: Vec<usize>,
    remaining: u64,
}

impl<'a> CombinationIter<'a> {
    fn new(axes: Vec<Axis<'a>>) -> Option<Self> {
        let total = combination_count(&axes)?;
        let cursor = vec![0; axes.len()];
        Some(Self {
            axes,
            cursor,
            remaining: total,
        })
    }

    /// Combinations not yet yielded.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    fn advance(&mut self) {
        for idx in (0..self.axes.len()).rev() {
            let len = self.axes[idx].variants.len();
            if len == 0 {
                continue;
            }
            self.cursor[idx] += 1;
            if self.cursor[idx] < len {
                return;
            }
            self.cursor[idx] = 0;
        }
    }
}

impl<'a> Iterator for CombinationIter<'a> {
    type Item = Combination<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let choices = self
            .axes
            .iter()
            .zip(&self.cursor)
            .map(|(axis, &pos)| (axis.property_id, axis.variants.get(pos).copied()))
            .collect();

        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance();
        }
        Some(Combination { choices })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

/// `∏ |listᵢ|` over non-empty lists (1 when all are empty); `None` on overflow.
fn combination_count(axes: &[Axis<'_>]) -> Option<u64> {
    axes.iter()
        .filter(|a| !a.variants.is_empty())
        .try_fold(1u64, |acc, a| acc.checked_mul(a.variants.len() as u64))
}

/// A combination that could not be persisted for a reason other than
/// already existing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedCombination {
    pub variant_ids: VariantKey,
    pub reason: String,
}

/// Outcome of one generation run (partial success is normal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub product_id: ProductId,
    pub created: Vec<Sku>,
    /// Combinations that already existed.
    pub skipped: usize,
    pub failed: Vec<FailedCombination>,
}

impl GenerationReport {
    fn new(product_id: ProductId) -> Self {
        Self {
            product_id,
            created: Vec::new(),
            skipped: 0,
            failed: Vec::new(),
        }
    }

    /// Combinations considered in this run.
    pub fn attempted(&self) -> usize {
        self.created.len() + self.skipped + self.failed.len()
    }

    /// Every combination now exists in the store.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Producer-time SKU generator over an injected [`SkuRepository`].
#[derive(Debug, Clone)]
pub struct VariantMatrixGenerator<S> {
    skus: S,
    max_combinations: u64,
}

impl<S> VariantMatrixGenerator<S>
where
    S: SkuRepository,
{
    pub fn new(skus: S) -> Self {
        Self {
            skus,
            max_combinations: DEFAULT_MAX_COMBINATIONS,
        }
    }

    pub fn with_max_combinations(mut self, max_combinations: u64) -> Self {
        self.max_combinations = max_combinations;
        self
    }

    pub fn max_combinations(&self) -> u64 {
        self.max_combinations
    }

    pub fn store(&self) -> &S {
        &self.skus
    }

    /// Validate the request and return the (lazy) matrix without persisting.
    pub fn plan<'a>(
        &self,
        product: &'a Product,
        selections: &DimensionSelections,
    ) -> DomainResult<CombinationIter<'a>> {
        let axes = selections.axes(product)?;
        let iter = CombinationIter::new(axes).ok_or_else(|| {
            DomainError::validation("combination count overflows u64")
        })?;
        if iter.remaining() > self.max_combinations {
            return Err(DomainError::validation(format!(
                "{} combinations requested, limit is {}",
                iter.remaining(),
                self.max_combinations
            )));
        }
        Ok(iter)
    }

    /// Persist every combination of the requested variants.
    ///
    /// Input errors fail the whole call before anything is written. Once
    /// persisting starts, per-combination failures are collected in the report
    /// and the batch continues.
    pub fn generate(
        &self,
        product: &Product,
        selections: &DimensionSelections,
    ) -> DomainResult<GenerationReport> {
        let combinations = self.plan(product, selections)?;
        let mut report = GenerationReport::new(product.id);

        for combination in combinations {
            let key = combination.key();
            let new_sku = match build_sku(product, &combination) {
                Ok(sku) => sku,
                Err(e) => {
                    warn!(product_id = %product.id, variant_ids = %key, error = %e, "combination rejected");
                    report.failed.push(FailedCombination {
                        variant_ids: key,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match self.skus.insert(new_sku) {
                Ok(sku) => report.created.push(sku),
                Err(StoreError::Duplicate(existing)) => {
                    debug!(product_id = %product.id, variant_ids = %existing, "combination exists, skipping");
                    report.skipped += 1;
                }
                Err(StoreError::Unavailable(reason)) => {
                    warn!(product_id = %product.id, variant_ids = %key, %reason, "failed to persist combination");
                    report.failed.push(FailedCombination {
                        variant_ids: key,
                        reason,
                    });
                }
            }
        }

        info!(
            product_id = %product.id,
            created = report.created.len(),
            skipped = report.skipped,
            failed = report.failed.len(),
            "variant generation finished"
        );
        Ok(report)
    }
}

fn build_sku(product: &Product, combination: &Combination<'_>) -> DomainResult<NewSku> {
    let variants: Vec<&Variant> = combination.variants().collect();
    let price = calculate_price(product.base_price, variants.iter().copied())?;
    let code = product
        .code
        .as_deref()
        .map(|prefix| sku_code(prefix, variants.iter().map(|v| v.name.as_str())));

    Ok(NewSku {
        product_id: product.id,
        variant_ids: combination.key(),
        price,
        image_ref: product.representative_image(&variants),
        code,
    })
}
