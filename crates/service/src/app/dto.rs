use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use configurator_catalog::Sku;
use configurator_core::{DomainError, ProductId, PropertyId, VariantId};
use configurator_engine::{DimensionSelections, FailedCombination, GenerationReport, Selection};
use configurator_fit::{Measurements, ShapeCategory};

use crate::app::errors::ServiceError;

// -------------------------
// Request DTOs
// -------------------------

/// Body of a generate-variants call: per property id, the variant ids to
/// materialize. A missing or empty list leaves the property unvaried.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateVariantsRequest {
    pub product_id: String,
    #[serde(default)]
    pub dimensions: BTreeMap<String, Vec<String>>,
}

/// Buyer selection as sent by a client. `null` means "no variant chosen".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionRequest {
    pub product_id: String,
    #[serde(default)]
    pub selection: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MeasurementsRequest {
    pub chest: f64,
    pub waist: f64,
    pub hips: f64,
}

impl GenerateVariantsRequest {
    pub fn into_parts(self) -> Result<(ProductId, DimensionSelections), ServiceError> {
        let product_id = parse_product_id(&self.product_id)?;
        let mut selections = DimensionSelections::new();
        for (property, variants) in &self.dimensions {
            let property_id: PropertyId = property.parse()?;
            if selections.get(&property_id).is_some() {
                return Err(DomainError::validation(format!(
                    "property {property_id} listed twice"
                ))
                .into());
            }
            let variant_ids = variants
                .iter()
                .map(|v| v.parse::<VariantId>())
                .collect::<Result<Vec<_>, _>>()?;
            selections.insert(property_id, variant_ids);
        }
        Ok((product_id, selections))
    }
}

impl SelectionRequest {
    /// Parse ids only. Properties sent as `null` are dropped without being
    /// checked against the product; `ConfiguratorService::resolve_request`
    /// checks them too.
    pub fn into_parts(self) -> Result<(ProductId, Selection), ServiceError> {
        let (product_id, selection, _) = self.parse()?;
        Ok((product_id, selection))
    }

    /// Product id, chosen variants, and the properties sent as `null`.
    pub(crate) fn parse(self) -> Result<(ProductId, Selection, Vec<PropertyId>), ServiceError> {
        let product_id = parse_product_id(&self.product_id)?;
        let mut selection = Selection::new();
        let mut unset = Vec::new();
        for (property, variant) in &self.selection {
            let property_id: PropertyId = property.parse()?;
            let Some(variant) = variant else {
                unset.push(property_id);
                continue;
            };
            if selection.select(property_id, variant.parse()?).is_some() {
                return Err(DomainError::validation(format!(
                    "property {property_id} listed twice"
                ))
                .into());
            }
        }
        Ok((product_id, selection, unset))
    }
}

impl TryFrom<MeasurementsRequest> for Measurements {
    type Error = ServiceError;

    fn try_from(value: MeasurementsRequest) -> Result<Self, Self::Error> {
        Ok(Measurements::new(value.chest, value.waist, value.hips)?)
    }
}

fn parse_product_id(raw: &str) -> Result<ProductId, ServiceError> {
    Ok(raw.parse::<ProductId>()?)
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateVariantsResponse {
    pub created: Vec<Sku>,
    pub skipped: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FailedCombination>,
}

impl From<GenerationReport> for GenerateVariantsResponse {
    fn from(report: GenerationReport) -> Self {
        Self {
            created: report.created,
            skipped: report.skipped,
            failed: report.failed,
        }
    }
}

/// `sku` is `None` while the selection matches nothing (e.g. still partial).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveSkuResponse {
    pub sku: Option<Sku>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeResponse {
    pub shape: ShapeCategory,
}
