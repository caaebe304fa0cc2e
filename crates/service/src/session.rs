//! Buyer session: loads one product's SKU set asynchronously, then resolves
//! selections against it synchronously.
//!
//! ## Load lifecycle
//!
//! ```text
//! Idle ──open(p)──▶ Loading{p} ──▶ Ready{p}
//!                        │     └──▶ Failed{p, reason}
//!                        └─open(q)─▶ Loading{q}   (load of p aborted)
//! ```
//!
//! Every `open` bumps a generation counter. A load task only publishes its
//! result if the generation it was started under is still current, so a
//! late completion for a product the buyer already left is dropped instead
//! of being merged into the new product's state.
//!
//! `ready` awaits the load task itself, so a task that dies without
//! publishing (a panicking source) still settles the session as `Failed`.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, warn};

use configurator_catalog::{Hotspot, Sku};
use configurator_core::{ProductId, PropertyId, VariantId};
use configurator_engine::{
    CatalogRepository, HotspotBinder, Selection, SkuIndex, SkuRepository, resolve_indexed,
};

use crate::app::errors::ServiceError;
use crate::app::services::{ConfiguratorService, ProductSnapshot};

/// Async source of product snapshots.
#[async_trait]
pub trait SkuSource: Send + Sync + 'static {
    async fn load(&self, product_id: ProductId) -> Result<ProductSnapshot, ServiceError>;
}

#[async_trait]
impl<L> SkuSource for Arc<L>
where
    L: SkuSource + ?Sized,
{
    async fn load(&self, product_id: ProductId) -> Result<ProductSnapshot, ServiceError> {
        (**self).load(product_id).await
    }
}

#[async_trait]
impl<C, S> SkuSource for ConfiguratorService<C, S>
where
    C: CatalogRepository + 'static,
    S: SkuRepository + 'static,
{
    async fn load(&self, product_id: ProductId) -> Result<ProductSnapshot, ServiceError> {
        self.snapshot(product_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading { product_id: ProductId },
    Ready { product_id: ProductId },
    Failed { product_id: ProductId, reason: String },
}

impl LoadState {
    pub fn product_id(&self) -> Option<ProductId> {
        match self {
            LoadState::Idle => None,
            LoadState::Loading { product_id }
            | LoadState::Ready { product_id }
            | LoadState::Failed { product_id, .. } => Some(*product_id),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading { .. })
    }
}

#[derive(Debug, Clone)]
struct Published {
    generation: u64,
    state: LoadState,
    snapshot: Option<Arc<ProductSnapshot>>,
}

/// One buyer configuring one product at a time.
///
/// Must be used from within a tokio runtime (`open` spawns the load task).
pub struct BuyerSession<L> {
    source: Arc<L>,
    published: Arc<watch::Sender<Published>>,
    generation: u64,
    task: Option<JoinHandle<()>>,
    selection: Selection,
    binder: Option<HotspotBinder>,
}

impl<L> BuyerSession<L>
where
    L: SkuSource,
{
    pub fn new(source: Arc<L>) -> Self {
        let (tx, _) = watch::channel(Published {
            generation: 0,
            state: LoadState::Idle,
            snapshot: None,
        });
        Self {
            source,
            published: Arc::new(tx),
            generation: 0,
            task: None,
            selection: Selection::new(),
            binder: None,
        }
    }

    pub fn state(&self) -> LoadState {
        self.published.borrow().state.clone()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Start loading `product_id`, abandoning any current product.
    ///
    /// The selection is discarded; nothing carries over between products.
    pub fn open(&mut self, product_id: ProductId) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation += 1;
        self.selection.clear();
        self.binder = None;

        let generation = self.generation;
        self.published.send_replace(Published {
            generation,
            state: LoadState::Loading { product_id },
            snapshot: None,
        });
        debug!(%product_id, generation, "loading product");

        let source = self.source.clone();
        let published = self.published.clone();
        self.task = Some(tokio::spawn(async move {
            let result = source.load(product_id).await;
            published.send_if_modified(|current| {
                if current.generation != generation {
                    debug!(%product_id, generation, "discarding stale load");
                    return false;
                }
                *current = match result {
                    Ok(snapshot) => Published {
                        generation,
                        state: LoadState::Ready { product_id },
                        snapshot: Some(Arc::new(snapshot)),
                    },
                    Err(err) => {
                        warn!(%product_id, error = %err, "product load failed");
                        Published {
                            generation,
                            state: LoadState::Failed {
                                product_id,
                                reason: err.to_string(),
                            },
                            snapshot: None,
                        }
                    }
                };
                true
            });
        }));
    }

    /// Wait until the current load settles.
    ///
    /// Returns the product id once ready; a failed load is returned as
    /// `Unavailable`, and waiting without having opened a product is a
    /// validation error.
    pub async fn ready(&mut self) -> Result<ProductId, ServiceError> {
        if let Some(task) = self.task.as_mut() {
            let joined = task.await;
            self.task = None;
            if let Err(err) = joined {
                self.publish_abnormal_end(err);
            }
        }

        let state = self.published.borrow().state.clone();
        match state {
            LoadState::Ready { product_id } => {
                self.loaded()?;
                Ok(product_id)
            }
            LoadState::Failed { reason, .. } => Err(ServiceError::Unavailable(reason)),
            LoadState::Idle => Err(ServiceError::Validation("no product opened".to_string())),
            LoadState::Loading { .. } => Err(ServiceError::Unavailable(
                "product load ended without a result".to_string(),
            )),
        }
    }

    /// The current load task ended without publishing a result.
    fn publish_abnormal_end(&self, err: JoinError) {
        let generation = self.generation;
        let reason = format!("product load ended abnormally: {err}");
        self.published.send_if_modified(|current| {
            if current.generation != generation || !current.state.is_loading() {
                return false;
            }
            let Some(product_id) = current.state.product_id() else {
                return false;
            };
            error!(%product_id, generation, %reason, "product load task died");
            current.state = LoadState::Failed { product_id, reason };
            current.snapshot = None;
            true
        });
    }

    /// Hotspots of the loaded product, one per property.
    pub fn hotspots(&self) -> Result<Vec<Hotspot>, ServiceError> {
        let snapshot = self.snapshot()?;
        Ok(match &self.binder {
            Some(binder) => binder.hotspots(),
            None => HotspotBinder::new(&snapshot.product, &snapshot.hotspots).hotspots(),
        })
    }

    pub fn active_property(&self) -> Option<PropertyId> {
        self.binder.as_ref().and_then(HotspotBinder::active_property)
    }

    /// A hotspot was pressed.
    pub fn activate(&mut self, property_id: PropertyId) -> Result<(), ServiceError> {
        self.loaded()?;
        if let Some(binder) = self.binder.as_mut() {
            binder.on_hotspot_activated(property_id)?;
        }
        Ok(())
    }

    /// Apply `variant_id` to the active property and return the SKU the
    /// selection now resolves to, if any.
    pub fn choose(&mut self, variant_id: VariantId) -> Result<Option<Sku>, ServiceError> {
        let snapshot = self.loaded()?;
        if let Some(binder) = self.binder.as_mut() {
            binder.choose(&snapshot.product, &mut self.selection, variant_id)?;
        }
        self.resolved()
    }

    /// Choose `variant_id` for an explicit property.
    pub fn select(
        &mut self,
        property_id: PropertyId,
        variant_id: VariantId,
    ) -> Result<Option<Sku>, ServiceError> {
        let snapshot = self.loaded()?;
        let mut next = self.selection.clone();
        next.select(property_id, variant_id);
        next.validate(&snapshot.product)?;
        self.selection = next;
        if let Some(binder) = self.binder.as_mut() {
            binder.reset(&self.selection);
        }
        self.resolved()
    }

    pub fn deselect(&mut self, property_id: &PropertyId) -> Option<VariantId> {
        let previous = self.selection.deselect(property_id);
        if let Some(binder) = self.binder.as_mut() {
            binder.reset(&self.selection);
        }
        previous
    }

    /// SKU matching the current selection; `None` while it is partial.
    pub fn resolved(&self) -> Result<Option<Sku>, ServiceError> {
        let snapshot = self.snapshot()?;
        let index = SkuIndex::build(&snapshot.product, &snapshot.skus);
        Ok(resolve_indexed(&index, &self.selection)?.cloned())
    }

    fn snapshot(&self) -> Result<Arc<ProductSnapshot>, ServiceError> {
        let published = self.published.borrow();
        match (&published.state, &published.snapshot) {
            (LoadState::Ready { .. }, Some(snapshot)) if published.generation == self.generation => {
                Ok(snapshot.clone())
            }
            _ => Err(ServiceError::Validation("product not loaded".to_string())),
        }
    }

    /// Snapshot of the ready product, with the binder built on first use.
    fn loaded(&mut self) -> Result<Arc<ProductSnapshot>, ServiceError> {
        let snapshot = self.snapshot()?;
        if self.binder.is_none() {
            self.binder = Some(HotspotBinder::new(&snapshot.product, &snapshot.hotspots));
        }
        Ok(snapshot)
    }
}

impl<L> Drop for BuyerSession<L> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
