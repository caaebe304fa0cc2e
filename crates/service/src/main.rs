//! `configurator-seed`: load a JSON catalog fixture and generate every
//! variant combination of every product into an in-memory SKU store.

use std::sync::Arc;

use anyhow::Context;

use configurator_engine::{DimensionSelections, SkuRepository};
use configurator_infra::{CatalogFixture, EngineConfig, InMemoryCatalogStore, InMemorySkuStore};
use configurator_service::ConfiguratorService;

fn main() -> anyhow::Result<()> {
    let config = EngineConfig::from_env().context("invalid configuration")?;
    configurator_observability::init_with(config.log_format);

    let path = config
        .catalog_path
        .clone()
        .or_else(|| std::env::args_os().nth(1).map(Into::into))
        .context("no catalog fixture given (set CONFIGURATOR_CATALOG or pass a path)")?;

    let catalog = Arc::new(InMemoryCatalogStore::new());
    let products = CatalogFixture::load(&path)
        .and_then(|fixture| fixture.seed(&catalog))
        .with_context(|| format!("failed to seed catalog from {}", path.display()))?;

    let service = ConfiguratorService::from_config(
        catalog.clone(),
        Arc::new(InMemorySkuStore::new()),
        &config,
    )
    .context("invalid configuration")?;

    let mut failed = 0;
    for product in &products {
        let report = service
            .generate_variants(product.id, &DimensionSelections::all_variants(product))
            .with_context(|| format!("failed to generate variants for '{}'", product.name))?;
        failed += report.failed.len();

        tracing::info!(
            product_id = %product.id,
            name = %product.name,
            created = report.created.len(),
            skipped = report.skipped,
            failed = report.failed.len(),
            total = service.skus().count_for_product(product.id)?,
            "product seeded"
        );
    }

    tracing::info!(products = products.len(), "catalog seeded");
    anyhow::ensure!(failed == 0, "{failed} combinations could not be stored");
    Ok(())
}
