//! Generated SKUs and their canonical variant keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use configurator_core::{Entity, ProductId, SkuId, ValueObject, VariantId};

use crate::pricing::Price;

/// Canonical form of a SKU's variant set: ids sorted ascending, no duplicates.
///
/// Two SKUs of the same product with equal keys are the same combination. The
/// key is what the uniqueness index and the resolver index are built on.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<VariantId>", into = "Vec<VariantId>")]
pub struct VariantKey(Vec<VariantId>);

impl ValueObject for VariantKey {}

impl VariantKey {
    /// The base configuration (no variants chosen).
    pub fn base() -> Self {
        Self(Vec::new())
    }

    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = VariantId>,
    {
        let mut ids: Vec<VariantId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &VariantId) -> bool {
        self.0.binary_search(id).is_ok()
    }

    /// Whether every id of `self` is also in `other`.
    pub fn is_subset(&self, other: &VariantKey) -> bool {
        self.0.iter().all(|id| other.contains(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariantId> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[VariantId] {
        &self.0
    }
}

impl From<Vec<VariantId>> for VariantKey {
    fn from(value: Vec<VariantId>) -> Self {
        Self::from_ids(value)
    }
}

impl From<VariantKey> for Vec<VariantId> {
    fn from(value: VariantKey) -> Self {
        value.0
    }
}

impl FromIterator<VariantId> for VariantKey {
    fn from_iter<T: IntoIterator<Item = VariantId>>(iter: T) -> Self {
        Self::from_ids(iter)
    }
}

impl core::fmt::Display for VariantKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<base>");
        }
        for (idx, id) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("+")?;
            }
            core::fmt::Display::fmt(id, f)?;
        }
        Ok(())
    }
}

/// A SKU about to be persisted (identity and timestamp are assigned by the store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSku {
    pub product_id: ProductId,
    pub variant_ids: VariantKey,
    pub price: Price,
    pub image_ref: Option<String>,
    pub code: Option<String>,
}

/// One concrete purchasable combination.
///
/// `price` is fixed at creation time and is the system of record afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    pub id: SkuId,
    pub product_id: ProductId,
    pub variant_ids: VariantKey,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Sku {
    pub fn from_new(new: NewSku, id: SkuId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            product_id: new.product_id,
            variant_ids: new.variant_ids,
            price: new.price,
            image_ref: new.image_ref,
            code: new.code,
            created_at,
        }
    }
}

impl Entity for Sku {
    type Id = SkuId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Build a human-readable SKU code: `PREFIX-VARIANT-VARIANT`.
///
/// Segments are upper-cased; runs of non-alphanumeric characters become a
/// single `-`. Empty segments are dropped.
pub fn sku_code<'a, I>(product_code: &str, variant_names: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut code = normalize_segment(product_code);
    for name in variant_names {
        let segment = normalize_segment(name);
        if segment.is_empty() {
            continue;
        }
        if !code.is_empty() {
            code.push('-');
        }
        code.push_str(&segment);
    }
    code
}

fn normalize_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for ch in raw.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(ch.to_uppercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_order_independent() {
        let a = VariantId::new();
        let b = VariantId::new();
        assert_eq!(VariantKey::from_ids([a, b]), VariantKey::from_ids([b, a]));
    }

    #[test]
    fn key_drops_duplicates() {
        let a = VariantId::new();
        let key = VariantKey::from_ids([a, a]);
        assert_eq!(key.len(), 1);
        assert!(key.contains(&a));
    }

    #[test]
    fn key_deserializes_canonically() {
        let a = VariantId::new();
        let b = VariantId::new();
        let json = serde_json::to_string(&vec![b, a, b]).unwrap();
        let key: VariantKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, VariantKey::from_ids([a, b]));
    }

    #[test]
    fn subset_check() {
        let a = VariantId::new();
        let b = VariantId::new();
        let small = VariantKey::from_ids([a]);
        let big = VariantKey::from_ids([a, b]);
        assert!(small.is_subset(&big));
        assert!(!big.is_subset(&small));
        assert!(VariantKey::base().is_subset(&small));
    }

    #[test]
    fn sku_code_normalizes_segments() {
        assert_eq!(sku_code("chair", ["Oak wood", "matte/black"]), "CHAIR-OAK-WOOD-MATTE-BLACK");
        assert_eq!(sku_code("CHAIR", std::iter::empty()), "CHAIR");
        assert_eq!(sku_code("CHAIR", ["  ", "x"]), "CHAIR-X");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: the key does not depend on input order or repetition.
            #[test]
            fn key_is_canonical(
                count in 0usize..8,
                rotate in 0usize..8,
                repeat in 0usize..3
            ) {
                let ids: Vec<VariantId> = (0..count).map(|_| VariantId::new()).collect();
                let mut shuffled = ids.clone();
                if !shuffled.is_empty() {
                    let by = rotate % shuffled.len();
                    shuffled.rotate_left(by);
                }
                for _ in 0..repeat {
                    shuffled.extend(ids.iter().copied());
                }

                let a = VariantKey::from_ids(ids.iter().copied());
                let b = VariantKey::from_ids(shuffled);
                prop_assert_eq!(&a, &b);
                prop_assert_eq!(a.len(), count);
                prop_assert!(a.as_slice().windows(2).all(|w| w[0] < w[1]));
            }
        }
    }
}
