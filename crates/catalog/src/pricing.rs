//! Price calculator.
//!
//! Amounts are integers in the smallest currency unit (e.g. cents). A SKU's
//! price is computed once, when the SKU is created, and stored; readers never
//! recompute it from the current variant deltas.

use serde::{Deserialize, Serialize};

use configurator_core::{DomainError, DomainResult, ValueObject};

use crate::property::Variant;

/// Absolute price in minor units.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub i64);

/// Signed price adjustment a variant applies on top of the base price.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceDelta(pub i64);

impl ValueObject for Price {}
impl ValueObject for PriceDelta {}

impl Price {
    pub fn minor_units(self) -> i64 {
        self.0
    }

    /// Apply a delta, failing on overflow.
    pub fn checked_add(self, delta: PriceDelta) -> Option<Price> {
        self.0.checked_add(delta.0).map(Price)
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `base_price + Σ variant.price_delta`.
pub fn calculate_price<'a, I>(base_price: Price, variants: I) -> DomainResult<Price>
where
    I: IntoIterator<Item = &'a Variant>,
{
    variants.into_iter().try_fold(base_price, |acc, variant| {
        acc.checked_add(variant.price_delta).ok_or_else(|| {
            DomainError::validation(format!(
                "price overflow applying delta {} of variant {}",
                variant.price_delta.0, variant.id
            ))
        })
    })
}
