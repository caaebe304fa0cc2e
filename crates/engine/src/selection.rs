//! Buyer selection: at most one chosen variant per property.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use configurator_catalog::{Product, VariantKey};
use configurator_core::{DomainError, DomainResult, PropertyId, VariantId};

/// Transient, buyer-owned map of property → chosen variant.
///
/// Keyed by property, so a selection can never hold two variants of the same
/// dimension. Never persisted by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeMap<PropertyId, VariantId>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose `variant_id` for `property_id`, returning the previous choice.
    pub fn select(&mut self, property_id: PropertyId, variant_id: VariantId) -> Option<VariantId> {
        self.0.insert(property_id, variant_id)
    }

    pub fn with(mut self, property_id: PropertyId, variant_id: VariantId) -> Self {
        self.select(property_id, variant_id);
        self
    }

    pub fn deselect(&mut self, property_id: &PropertyId) -> Option<VariantId> {
        self.0.remove(property_id)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn get(&self, property_id: &PropertyId) -> Option<VariantId> {
        self.0.get(property_id).copied()
    }

    pub fn contains(&self, property_id: &PropertyId) -> bool {
        self.0.contains_key(property_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropertyId, &VariantId)> {
        self.0.iter()
    }

    /// `set(selection.values())` in canonical form.
    pub fn variant_key(&self) -> VariantKey {
        self.0.values().copied().collect()
    }

    /// Check every entry against the product's declared dimensions.
    pub fn validate(&self, product: &Product) -> DomainResult<()> {
        for (property_id, variant_id) in &self.0 {
            let dimension = product.dimension(property_id).ok_or_else(|| {
                DomainError::not_found(format!("property {property_id} on product {}", product.id))
            })?;
            if dimension.variant(variant_id).is_none() {
                return Err(DomainError::not_found(format!(
                    "variant {variant_id} on property {}",
                    dimension.property.name
                )));
            }
        }
        Ok(())
    }
}

impl FromIterator<(PropertyId, VariantId)> for Selection {
    fn from_iter<T: IntoIterator<Item = (PropertyId, VariantId)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::test_support::chair;

    #[test]
    fn reselecting_a_property_replaces_the_choice() {
        let c = chair();
        let mut selection = Selection::new();
        assert_eq!(selection.select(c.style, c.a), None);
        assert_eq!(selection.select(c.style, c.b), Some(c.a));
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.variant_key(), VariantKey::from_ids([c.b]));
    }

    #[test]
    fn validate_accepts_declared_choices() {
        let c = chair();
        let selection = Selection::new().with(c.style, c.a).with(c.material, c.y);
        assert!(selection.validate(&c.product).is_ok());
    }

    #[test]
    fn validate_rejects_variant_under_wrong_property() {
        let c = chair();
        let selection = Selection::new().with(c.style, c.x);
        assert!(matches!(selection.validate(&c.product), Err(DomainError::NotFound(_))));
    }

    #[test]
    fn validate_rejects_unknown_property() {
        let c = chair();
        let selection = Selection::new().with(PropertyId::new(), c.a);
        assert!(matches!(selection.validate(&c.product), Err(DomainError::NotFound(_))));
    }
}
