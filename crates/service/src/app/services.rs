use tracing::{info, instrument, warn};

use configurator_catalog::{Hotspot, Product, Sku, Variant};
use configurator_core::{ProductId, PropertyId};
use configurator_engine::{
    CatalogRepository, DimensionSelections, GenerationReport, HotspotBinder, Selection, SkuIndex,
    SkuRepository, VariantMatrixGenerator, available_variants, resolve_indexed,
};
use configurator_fit::{BodyShapeClassifier, Measurements, ShapeCategory};
use configurator_infra::EngineConfig;

use crate::app::dto::{ResolveSkuResponse, SelectionRequest};
use crate::app::errors::ServiceError;

/// Everything a buyer session needs about one product, read in one go.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    pub product: Product,
    /// Explicit hotspots only; the binder fills in defaults.
    pub hotspots: Vec<Hotspot>,
    pub skus: Vec<Sku>,
}

/// Facade over the engine: the four exposed operations plus a few reads.
///
/// Repositories are injected; nothing here holds global state.
#[derive(Debug, Clone)]
pub struct ConfiguratorService<C, S> {
    catalog: C,
    generator: VariantMatrixGenerator<S>,
    classifier: BodyShapeClassifier,
}

impl<C, S> ConfiguratorService<C, S>
where
    C: CatalogRepository,
    S: SkuRepository,
{
    pub fn new(catalog: C, skus: S) -> Self {
        Self {
            catalog,
            generator: VariantMatrixGenerator::new(skus),
            classifier: BodyShapeClassifier::default(),
        }
    }

    pub fn from_config(catalog: C, skus: S, config: &EngineConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            catalog,
            generator: VariantMatrixGenerator::new(skus)
                .with_max_combinations(config.max_combinations),
            classifier: config.classifier()?,
        })
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn skus(&self) -> &S {
        self.generator.store()
    }

    /// Materialize the chosen variant combinations of a product as SKUs.
    #[instrument(skip(self, selections))]
    pub fn generate_variants(
        &self,
        product_id: ProductId,
        selections: &DimensionSelections,
    ) -> Result<GenerationReport, ServiceError> {
        let product = self.product(product_id)?;
        let report = self.generator.generate(&product, selections)?;
        if !report.is_complete() {
            warn!(
                %product_id,
                failed = report.failed.len(),
                "generation finished with failures"
            );
        }
        Ok(report)
    }

    /// The SKU whose variant set equals the selection, if any.
    pub fn resolve_sku(
        &self,
        product_id: ProductId,
        selection: &Selection,
    ) -> Result<Option<Sku>, ServiceError> {
        let product = self.product(product_id)?;
        self.resolve_on(&product, selection)
    }

    /// Resolve a client selection. Every property it names must belong to
    /// the product, including properties sent as `null`.
    pub fn resolve_request(
        &self,
        request: SelectionRequest,
    ) -> Result<ResolveSkuResponse, ServiceError> {
        let (product_id, selection, unset) = request.parse()?;
        let product = self.product(product_id)?;
        if let Some(unknown) = unset.iter().find(|p| product.dimension(p).is_none()) {
            return Err(ServiceError::NotFound(format!(
                "property {unknown} on product {product_id}"
            )));
        }
        Ok(ResolveSkuResponse {
            sku: self.resolve_on(&product, &selection)?,
        })
    }

    /// One hotspot per property, in dimension order; unplaced ones centered.
    pub fn get_hotspots(&self, product_id: ProductId) -> Result<Vec<Hotspot>, ServiceError> {
        let product = self.product(product_id)?;
        let explicit = self.catalog.hotspots(product_id)?;
        Ok(HotspotBinder::new(&product, &explicit).hotspots())
    }

    pub fn classify_body_shape(
        &self,
        measurements: &Measurements,
    ) -> Result<ShapeCategory, ServiceError> {
        Ok(self.classifier.classify(measurements)?)
    }

    /// Variants of `property_id` still reachable given the rest of the selection.
    pub fn available_variants(
        &self,
        product_id: ProductId,
        selection: &Selection,
        property_id: PropertyId,
    ) -> Result<Vec<Variant>, ServiceError> {
        let product = self.product(product_id)?;
        selection.validate(&product)?;
        let skus = self.generator.store().list_for_product(product_id)?;
        let index = SkuIndex::build(&product, &skus);
        let variants = available_variants(&product, &index, selection, property_id)?;
        Ok(variants.into_iter().cloned().collect())
    }

    /// Product, explicit hotspots and SKU set in one read.
    pub fn snapshot(&self, product_id: ProductId) -> Result<ProductSnapshot, ServiceError> {
        let product = self.product(product_id)?;
        let hotspots = self.catalog.hotspots(product_id)?;
        let skus = self.generator.store().list_for_product(product_id)?;
        info!(%product_id, skus = skus.len(), "loaded product snapshot");
        Ok(ProductSnapshot {
            product,
            hotspots,
            skus,
        })
    }

    fn resolve_on(
        &self,
        product: &Product,
        selection: &Selection,
    ) -> Result<Option<Sku>, ServiceError> {
        selection.validate(product)?;
        let skus = self.generator.store().list_for_product(product.id)?;
        let index = SkuIndex::build(product, &skus);
        Ok(resolve_indexed(&index, selection)?.cloned())
    }

    fn product(&self, product_id: ProductId) -> Result<Product, ServiceError> {
        self.catalog
            .product(product_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("product {product_id}")))
    }
}
