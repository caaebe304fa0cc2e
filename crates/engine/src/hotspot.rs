//! Hotspot binding and active-dimension tracking.
//!
//! Each property gets a marker on the product image. Pressing a marker makes
//! its property the *active* one; the next variant the buyer picks is applied
//! to that property of the [`Selection`], after which the binder moves on to
//! the next property still waiting for a choice.

use std::collections::HashMap;

use tracing::debug;

use configurator_catalog::{Coordinate, Hotspot, Product, Property};
use configurator_core::{DomainError, DomainResult, PropertyId, VariantId};

use crate::selection::Selection;

/// Coordinate per property; properties without a hotspot sit at the center.
///
/// Hotspots naming properties outside `properties` are ignored. When a
/// property has several hotspots the last one wins.
pub fn bind<'a, P>(properties: P, hotspots: &[Hotspot]) -> HashMap<PropertyId, Coordinate>
where
    P: IntoIterator<Item = &'a Property>,
{
    let mut coordinates: HashMap<PropertyId, Coordinate> = properties
        .into_iter()
        .map(|p| (p.id, Coordinate::CENTER))
        .collect();

    for hotspot in hotspots {
        match coordinates.get_mut(&hotspot.property_id) {
            Some(slot) => *slot = hotspot.coordinate(),
            None => debug!(property_id = %hotspot.property_id, "ignoring hotspot for unknown property"),
        }
    }
    coordinates
}

/// Buyer-side interaction state for one product.
#[derive(Debug, Clone)]
pub struct HotspotBinder {
    /// Properties in dimension order, with whether they declare variants.
    order: Vec<(PropertyId, bool)>,
    coordinates: HashMap<PropertyId, Coordinate>,
    active: Option<PropertyId>,
}

impl HotspotBinder {
    /// Bind `hotspots` to the product's properties. The first property with
    /// variants starts out active.
    pub fn new(product: &Product, hotspots: &[Hotspot]) -> Self {
        let order: Vec<(PropertyId, bool)> = product
            .dimensions
            .iter()
            .map(|d| (d.property.id, d.is_varied()))
            .collect();
        let active = order.iter().find(|(_, varied)| *varied).map(|(id, _)| *id);

        Self {
            order,
            coordinates: bind(product.properties(), hotspots),
            active,
        }
    }

    pub fn coordinate(&self, property_id: &PropertyId) -> Option<Coordinate> {
        self.coordinates.get(property_id).copied()
    }

    /// One hotspot per property, in dimension order, defaults filled in.
    pub fn hotspots(&self) -> Vec<Hotspot> {
        self.order
            .iter()
            .map(|(id, _)| {
                let c = self.coordinates.get(id).copied().unwrap_or_default();
                Hotspot::new(*id, c.x, c.y)
            })
            .collect()
    }

    pub fn active_property(&self) -> Option<PropertyId> {
        self.active
    }

    /// A hotspot was pressed: its property receives the next choice.
    pub fn on_hotspot_activated(&mut self, property_id: PropertyId) -> DomainResult<()> {
        if !self.order.iter().any(|(id, _)| *id == property_id) {
            return Err(DomainError::not_found(format!("property {property_id}")));
        }
        debug!(%property_id, "hotspot activated");
        self.active = Some(property_id);
        Ok(())
    }

    /// Apply `variant_id` to the active property, then advance to the next
    /// varied property without a choice (wrapping around). Returns the new
    /// active property, `None` once every varied property has a choice.
    pub fn choose(
        &mut self,
        product: &Product,
        selection: &mut Selection,
        variant_id: VariantId,
    ) -> DomainResult<Option<PropertyId>> {
        let active = self
            .active
            .ok_or_else(|| DomainError::validation("no property is active"))?;
        let dimension = product
            .dimension(&active)
            .ok_or_else(|| DomainError::not_found(format!("property {active}")))?;
        if dimension.variant(&variant_id).is_none() {
            return Err(DomainError::not_found(format!(
                "variant {variant_id} on property {}",
                dimension.property.name
            )));
        }

        selection.select(active, variant_id);
        self.active = self.next_pending(active, selection);
        Ok(self.active)
    }

    /// Forget the active property (e.g. when the flow restarts).
    pub fn reset(&mut self, selection: &Selection) {
        self.active = self
            .order
            .iter()
            .find(|(id, varied)| *varied && !selection.contains(id))
            .map(|(id, _)| *id);
    }

    fn next_pending(&self, after: PropertyId, selection: &Selection) -> Option<PropertyId> {
        let start = self
            .order
            .iter()
            .position(|(id, _)| *id == after)
            .map(|i| i + 1)
            .unwrap_or(0);
        let len = self.order.len();
        (0..len)
            .map(|offset| &self.order[(start + offset) % len])
            .find(|(id, varied)| *varied && !selection.contains(id))
            .map(|(id, _)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::test_support::chair;

    #[test]
    fn missing_hotspots_default_to_center() {
        let c = chair();
        let hotspots = [Hotspot::new(c.style, 0.2, 0.8)];

        let coordinates = bind(c.product.properties(), &hotspots);

        assert_eq!(coordinates.len(), 3);
        assert_eq!(coordinates[&c.style], Coordinate { x: 0.2, y: 0.8 });
        assert_eq!(coordinates[&c.material], Coordinate::CENTER);
        assert_eq!(coordinates[&c.finish], Coordinate::CENTER);
    }

    #[test]
    fn hotspots_for_foreign_properties_are_ignored() {
        let c = chair();
        let hotspots = [Hotspot::new(PropertyId::new(), 0.1, 0.1)];
        let coordinates = bind(c.product.properties(), &hotspots);
        assert_eq!(coordinates.len(), 3);
    }

    #[test]
    fn binder_lists_one_hotspot_per_property_in_order() {
        let c = chair();
        let binder = HotspotBinder::new(&c.product, &[Hotspot::new(c.material, 1.5, 0.3)]);

        let hotspots = binder.hotspots();
        let ids: Vec<_> = hotspots.iter().map(|h| h.property_id).collect();
        assert_eq!(ids, vec![c.style, c.material, c.finish]);
        assert_eq!(hotspots[1].coordinate(), Coordinate { x: 1.0, y: 0.3 });
    }

    #[test]
    fn choose_applies_to_active_and_skips_unvaried_dimensions() {
        let c = chair();
        let mut binder = HotspotBinder::new(&c.product, &[]);
        let mut selection = Selection::new();
        assert_eq!(binder.active_property(), Some(c.style));

        let next = binder.choose(&c.product, &mut selection, c.b).unwrap();
        assert_eq!(next, Some(c.material));

        let next = binder.choose(&c.product, &mut selection, c.x).unwrap();
        assert_eq!(next, None);
        assert_eq!(selection.get(&c.style), Some(c.b));
        assert_eq!(selection.get(&c.material), Some(c.x));
    }

    #[test]
    fn activation_redirects_next_choice() {
        let c = chair();
        let mut binder = HotspotBinder::new(&c.product, &[]);
        let mut selection = Selection::new().with(c.style, c.a).with(c.material, c.x);
        binder.reset(&selection);
        assert_eq!(binder.active_property(), None);

        binder.on_hotspot_activated(c.style).unwrap();
        binder.choose(&c.product, &mut selection, c.b).unwrap();
        assert_eq!(selection.get(&c.style), Some(c.b));
    }

    #[test]
    fn choosing_variant_of_another_property_fails() {
        let c = chair();
        let mut binder = HotspotBinder::new(&c.product, &[]);
        let mut selection = Selection::new();
        let err = binder.choose(&c.product, &mut selection, c.y).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(selection.is_empty());
    }

    #[test]
    fn activating_unknown_property_is_not_found() {
        let c = chair();
        let mut binder = HotspotBinder::new(&c.product, &[]);
        assert!(binder.on_hotspot_activated(PropertyId::new()).is_err());
        assert_eq!(binder.active_property(), Some(c.style));
    }
}
