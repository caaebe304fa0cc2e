//! Properties (customization dimensions) and their variants.

use serde::{Deserialize, Serialize};

use configurator_core::{Entity, PropertyId, VariantId};

use crate::pricing::PriceDelta;

/// One customizable axis of a product (e.g. "Material").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
}

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PropertyId::new(),
            name: name.into(),
        }
    }
}

impl Entity for Property {
    type Id = PropertyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// One concrete choice for a property, with its price adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub property_id: PropertyId,
    pub name: String,
    pub price_delta: PriceDelta,
    /// Media reference for this choice (swatch or rendered preview).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl Variant {
    pub fn new(property_id: PropertyId, name: impl Into<String>, price_delta: PriceDelta) -> Self {
        Self {
            id: VariantId::new(),
            property_id,
            name: name.into(),
            price_delta,
            image_ref: None,
        }
    }

    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }
}

impl Entity for Variant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
