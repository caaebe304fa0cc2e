use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::Utc;
use tracing::warn;

use configurator_catalog::{NewSku, Sku, VariantKey};
use configurator_core::{ProductId, SkuId};
use configurator_engine::{SkuRepository, StoreError};

use super::poisoned;

#[derive(Debug, Default)]
struct SkuTable {
    by_product: HashMap<ProductId, Vec<Sku>>,
    unique: HashSet<(ProductId, VariantKey)>,
}

/// In-memory SKU store with a unique index over `(product_id, variant_ids)`.
///
/// The check and the insert happen under one write lock, so concurrent
/// generation runs for the same product can never both insert a combination.
#[derive(Debug, Default)]
pub struct InMemorySkuStore {
    inner: RwLock<SkuTable>,
}

impl InMemorySkuStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load previously persisted SKUs verbatim, bypassing the unique index.
    ///
    /// Rows are kept even when they collide with an existing variant set
    /// (legacy data); such rows are logged and will surface as integrity
    /// violations on resolve. Returns the number of colliding rows.
    pub fn restore<I>(&self, skus: I) -> Result<usize, StoreError>
    where
        I: IntoIterator<Item = Sku>,
    {
        let mut table = self.inner.write().map_err(|_| poisoned())?;
        let mut collisions = 0;
        for sku in skus {
            if !table.unique.insert((sku.product_id, sku.variant_ids.clone())) {
                warn!(
                    product_id = %sku.product_id,
                    sku_id = %sku.id,
                    variant_ids = %sku.variant_ids,
                    "restored SKU collides with an existing variant set"
                );
                collisions += 1;
            }
            table.by_product.entry(sku.product_id).or_default().push(sku);
        }
        Ok(collisions)
    }

    /// Total number of stored SKUs across products.
    pub fn len(&self) -> Result<usize, StoreError> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        Ok(table.by_product.values().map(Vec::len).sum())
    }
}

impl SkuRepository for InMemorySkuStore {
    fn insert(&self, sku: NewSku) -> Result<Sku, StoreError> {
        let mut guard = self.inner.write().map_err(|_| poisoned())?;
        let table = &mut *guard;

        if !table.unique.insert((sku.product_id, sku.variant_ids.clone())) {
            return Err(StoreError::Duplicate(sku.variant_ids));
        }

        let stored = Sku::from_new(sku, SkuId::new(), Utc::now());
        table
            .by_product
            .entry(stored.product_id)
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    fn list_for_product(&self, product_id: ProductId) -> Result<Vec<Sku>, StoreError> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        Ok(table.by_product.get(&product_id).cloned().unwrap_or_default())
    }

    fn count_for_product(&self, product_id: ProductId) -> Result<usize, StoreError> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        Ok(table.by_product.get(&product_id).map(Vec::len).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use configurator_catalog::Price;
    use configurator_core::VariantId;

    fn new_sku(product_id: ProductId, ids: &[VariantId]) -> NewSku {
        NewSku {
            product_id,
            variant_ids: VariantKey::from_ids(ids.iter().copied()),
            price: Price(100),
            image_ref: None,
            code: None,
        }
    }

    #[test]
    fn second_insert_of_same_combination_is_duplicate() {
        let store = InMemorySkuStore::new();
        let product_id = ProductId::new();
        let (a, x) = (VariantId::new(), VariantId::new());

        store.insert(new_sku(product_id, &[a, x])).unwrap();
        let err = store.insert(new_sku(product_id, &[x, a])).unwrap_err();

        assert_eq!(err, StoreError::Duplicate(VariantKey::from_ids([a, x])));
        assert_eq!(store.count_for_product(product_id).unwrap(), 1);
    }

    #[test]
    fn same_combination_on_another_product_is_allowed() {
        let store = InMemorySkuStore::new();
        let a = VariantId::new();

        store.insert(new_sku(ProductId::new(), &[a])).unwrap();
        store.insert(new_sku(ProductId::new(), &[a])).unwrap();
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn list_is_scoped_to_product_in_insertion_order() {
        let store = InMemorySkuStore::new();
        let product_id = ProductId::new();
        let first = store.insert(new_sku(product_id, &[VariantId::new()])).unwrap();
        let second = store.insert(new_sku(product_id, &[])).unwrap();
        store.insert(new_sku(ProductId::new(), &[])).unwrap();

        let ids: Vec<_> = store
            .list_for_product(product_id)
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert!(store.list_for_product(ProductId::new()).unwrap().is_empty());
    }

    #[test]
    fn restore_keeps_colliding_rows_and_counts_them() {
        let store = InMemorySkuStore::new();
        let product_id = ProductId::new();
        let original = store.insert(new_sku(product_id, &[])).unwrap();
        let mut copy = original.clone();
        copy.id = SkuId::new();

        assert_eq!(store.restore([copy]).unwrap(), 1);
        assert_eq!(store.count_for_product(product_id).unwrap(), 2);
        // The unique index still rejects fresh inserts.
        assert!(store.insert(new_sku(product_id, &[])).is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::collection::vec;
        use proptest::prelude::*;

        proptest! {
            /// Property: however combinations are repeated or reordered, the
            /// store keeps one SKU per distinct variant set and reports every
            /// repeat as a duplicate.
            #[test]
            fn one_sku_per_distinct_variant_set(
                picks in vec(vec(0usize..4, 0..4), 1..24),
            ) {
                let pool: Vec<VariantId> = (0..4).map(|_| VariantId::new()).collect();
                let store = InMemorySkuStore::new();
                let product_id = ProductId::new();

                let mut distinct = HashSet::new();
                let mut duplicates = 0;
                for pick in &picks {
                    let ids: Vec<VariantId> = pick.iter().map(|i| pool[*i]).collect();
                    let key = VariantKey::from_ids(ids.iter().copied());
                    let fresh = distinct.insert(key.clone());
                    match store.insert(new_sku(product_id, &ids)) {
                        Ok(sku) => {
                            prop_assert!(fresh);
                            prop_assert_eq!(sku.variant_ids, key);
                        }
                        Err(StoreError::Duplicate(existing)) => {
                            prop_assert!(!fresh);
                            prop_assert_eq!(existing, key);
                            duplicates += 1;
                        }
                        Err(other) => prop_assert!(false, "unexpected store error: {other}"),
                    }
                }

                prop_assert_eq!(store.count_for_product(product_id).unwrap(), distinct.len());
                prop_assert_eq!(distinct.len() + duplicates, picks.len());
            }
        }
    }
}
