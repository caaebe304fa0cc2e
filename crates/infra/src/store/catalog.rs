use std::collections::BTreeMap;
use std::sync::RwLock;

use configurator_catalog::{Hotspot, Product};
use configurator_core::ProductId;
use configurator_engine::{CatalogRepository, StoreError};

use super::poisoned;

#[derive(Debug, Clone)]
struct CatalogEntry {
    product: Product,
    hotspots: Vec<Hotspot>,
}

/// In-memory catalog for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    products: RwLock<BTreeMap<ProductId, CatalogEntry>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product together with its hotspots.
    pub fn upsert(&self, product: Product, hotspots: Vec<Hotspot>) -> Result<(), StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        products.insert(product.id, CatalogEntry { product, hotspots });
        Ok(())
    }

    /// All products, ordered by id.
    pub fn list(&self) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(products.values().map(|e| e.product.clone()).collect())
    }
}

impl CatalogRepository for InMemoryCatalogStore {
    fn product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(products.get(&product_id).map(|e| e.product.clone()))
    }

    fn hotspots(&self, product_id: ProductId) -> Result<Vec<Hotspot>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(products
            .get(&product_id)
            .map(|e| e.hotspots.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use configurator_catalog::Price;

    #[test]
    fn upsert_replaces_product_and_hotspots() {
        let store = InMemoryCatalogStore::new();
        let mut product = Product::new("Lamp", Price(4_000));
        let shade = product.add_property("Shade");
        store
            .upsert(product.clone(), vec![Hotspot::new(shade, 0.5, 0.1)])
            .unwrap();

        product.name = "Desk lamp".to_string();
        store.upsert(product.clone(), Vec::new()).unwrap();

        let stored = store.product(product.id).unwrap().unwrap();
        assert_eq!(stored.name, "Desk lamp");
        assert!(store.hotspots(product.id).unwrap().is_empty());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn unknown_product_is_absent() {
        let store = InMemoryCatalogStore::new();
        assert_eq!(store.product(ProductId::new()).unwrap(), None);
        assert!(store.hotspots(ProductId::new()).unwrap().is_empty());
    }
}
