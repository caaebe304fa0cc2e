//! JSON catalog fixtures.
//!
//! A fixture describes products by name; ids are assigned when the fixture
//! is built. Example:
//!
//! ```json
//! {
//!   "products": [{
//!     "name": "Chair",
//!     "code": "CHAIR",
//!     "base_price": 10000,
//!     "properties": [
//!       { "name": "Style", "hotspot": { "x": 0.3, "y": 0.2 },
//!         "variants": [{ "name": "A" }, { "name": "B", "price_delta": 5000 }] },
//!       { "name": "Finish" }
//!     ]
//!   }]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use configurator_catalog::{Hotspot, Price, PriceDelta, Product, Variant};
use configurator_core::DomainError;
use configurator_engine::StoreError;

use crate::store::InMemoryCatalogStore;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog fixture: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid product '{product}': {source}")]
    Invalid {
        product: String,
        #[source]
        source: DomainError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogFixture {
    #[serde(default)]
    pub products: Vec<ProductFixture>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFixture {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    /// Minor currency units.
    pub base_price: i64,
    #[serde(default)]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyFixture>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyFixture {
    pub name: String,
    #[serde(default)]
    pub hotspot: Option<HotspotFixture>,
    #[serde(default)]
    pub variants: Vec<VariantFixture>,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotFixture {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantFixture {
    pub name: String,
    #[serde(default)]
    pub price_delta: i64,
    #[serde(default)]
    pub image_ref: Option<String>,
}

/// A product built from a fixture, with its explicit hotspots.
#[derive(Debug, Clone, PartialEq)]
pub struct SeededProduct {
    pub product: Product,
    pub hotspots: Vec<Hotspot>,
}

impl CatalogFixture {
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Assign ids and validate every product.
    pub fn build(&self) -> Result<Vec<SeededProduct>, FixtureError> {
        self.products.iter().map(ProductFixture::build).collect()
    }

    /// Build and upsert every product into `store`.
    pub fn seed(&self, store: &InMemoryCatalogStore) -> Result<Vec<Product>, FixtureError> {
        let seeded = self.build()?;
        let mut products = Vec::with_capacity(seeded.len());
        for SeededProduct { product, hotspots } in seeded {
            info!(
                product_id = %product.id,
                name = %product.name,
                dimensions = product.dimensions.len(),
                "seeding product"
            );
            store.upsert(product.clone(), hotspots)?;
            products.push(product);
        }
        Ok(products)
    }
}

impl ProductFixture {
    fn build(&self) -> Result<SeededProduct, FixtureError> {
        let invalid = |source: DomainError| FixtureError::Invalid {
            product: self.name.clone(),
            source,
        };

        let mut product = Product::new(self.name.clone(), Price(self.base_price));
        product.code = self.code.clone();
        product.image_ref = self.image_ref.clone();

        let mut hotspots = Vec::new();
        for property in &self.properties {
            if product
                .properties()
                .any(|p| p.name.eq_ignore_ascii_case(&property.name))
            {
                return Err(invalid(DomainError::validation(format!(
                    "property '{}' declared twice",
                    property.name
                ))));
            }
            let property_id = product.add_property(property.name.clone());
            if let Some(h) = property.hotspot {
                hotspots.push(Hotspot::new(property_id, h.x, h.y));
            }
            for v in &property.variants {
                let mut variant =
                    Variant::new(property_id, v.name.clone(), PriceDelta(v.price_delta));
                variant.image_ref = v.image_ref.clone();
                product.push_variant(variant).map_err(invalid)?;
            }
        }

        product.validate().map_err(invalid)?;
        Ok(SeededProduct { product, hotspots })
    }
}
