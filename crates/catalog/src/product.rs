//! Configurable products and their dimensions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use configurator_core::{DomainError, DomainResult, Entity, ProductId, PropertyId, VariantId};

use crate::pricing::{Price, PriceDelta};
use crate::property::{Property, Variant};
use crate::sku::VariantKey;

/// A property together with the variants declared for it, in seller order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub property: Property,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Dimension {
    pub fn property_id(&self) -> PropertyId {
        self.property.id
    }

    pub fn variant(&self, variant_id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == *variant_id)
    }

    /// A dimension without declared variants never contributes to a SKU.
    pub fn is_varied(&self) -> bool {
        !self.variants.is_empty()
    }
}

/// A product with customizable dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Short prefix used to build human-readable SKU codes (e.g. "CHAIR").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub base_price: Price,
    /// Canonical product image (hotspots are positioned on it).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
}

impl Product {
    pub fn new(name: impl Into<String>, base_price: Price) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
            code: None,
            base_price,
            image_ref: None,
            dimensions: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    /// Declare a new dimension (without variants yet).
    pub fn add_property(&mut self, name: impl Into<String>) -> PropertyId {
        let property = Property::new(name);
        let id = property.id;
        self.dimensions.push(Dimension {
            property,
            variants: Vec::new(),
        });
        id
    }

    pub fn add_variant(
        &mut self,
        property_id: PropertyId,
        name: impl Into<String>,
        price_delta: PriceDelta,
    ) -> DomainResult<VariantId> {
        self.push_variant(Variant::new(property_id, name, price_delta))
    }

    /// Attach an already-built variant to the dimension it names.
    pub fn push_variant(&mut self, variant: Variant) -> DomainResult<VariantId> {
        if self.variant(&variant.id).is_some() {
            return Err(DomainError::validation(format!(
                "variant {} already declared",
                variant.id
            )));
        }
        let dimension = self
            .dimensions
            .iter_mut()
            .find(|d| d.property.id == variant.property_id)
            .ok_or_else(|| {
                DomainError::not_found(format!("property {}", variant.property_id))
            })?;
        let id = variant.id;
        dimension.variants.push(variant);
        Ok(id)
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.dimensions.iter().map(|d| &d.property)
    }

    pub fn dimension(&self, property_id: &PropertyId) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.property.id == *property_id)
    }

    pub fn variant(&self, variant_id: &VariantId) -> Option<&Variant> {
        self.dimensions
            .iter()
            .flat_map(|d| d.variants.iter())
            .find(|v| v.id == *variant_id)
    }

    /// Dimensions that declare at least one variant.
    pub fn varied_dimensions(&self) -> impl Iterator<Item = &Dimension> {
        self.dimensions.iter().filter(|d| d.is_varied())
    }

    /// Check that a variant set only names this product's variants, with at most
    /// one variant per property.
    ///
    /// Returns the variants in dimension order.
    pub fn variants_for_key(&self, key: &VariantKey) -> DomainResult<Vec<&Variant>> {
        let mut resolved = Vec::with_capacity(key.len());
        for dimension in &self.dimensions {
            let mut in_dimension = dimension.variants.iter().filter(|v| key.contains(&v.id));
            if let Some(variant) = in_dimension.next() {
                if let Some(second) = in_dimension.next() {
                    return Err(DomainError::validation(format!(
                        "variants {} and {} both belong to property {}",
                        variant.id, second.id, dimension.property.name
                    )));
                }
                resolved.push(variant);
            }
        }
        if resolved.len() != key.len() {
            let unknown = key
                .iter()
                .find(|id| self.variant(id).is_none())
                .map(ToString::to_string)
                .unwrap_or_default();
            return Err(DomainError::not_found(format!(
                "variant {unknown} on product {}",
                self.id
            )));
        }
        Ok(resolved)
    }

    /// Image of the first chosen variant that has one, else the product image.
    pub fn representative_image(&self, variants: &[&Variant]) -> Option<String> {
        variants
            .iter()
            .find_map(|v| v.image_ref.clone())
            .or_else(|| self.image_ref.clone())
    }

    /// Structural validation for catalog data coming from outside the engine.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }

        let mut property_ids = HashSet::new();
        let mut variant_ids = HashSet::new();
        for dimension in &self.dimensions {
            if !property_ids.insert(dimension.property.id) {
                return Err(DomainError::validation(format!(
                    "property {} declared twice",
                    dimension.property.id
                )));
            }
            for variant in &dimension.variants {
                if variant.property_id != dimension.property.id {
                    return Err(DomainError::validation(format!(
                        "variant {} is filed under property {} but names property {}",
                        variant.id, dimension.property.id, variant.property_id
                    )));
                }
                if !variant_ids.insert(variant.id) {
                    return Err(DomainError::validation(format!(
                        "variant {} declared twice",
                        variant.id
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
