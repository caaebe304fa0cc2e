//! Storage adapters implementing the engine's repository ports.
//!
//! Only in-memory implementations live here; they back tests, the seeding
//! binary and local development.

pub mod catalog;
pub mod sku;

pub use catalog::InMemoryCatalogStore;
pub use sku::InMemorySkuStore;

fn poisoned() -> configurator_engine::StoreError {
    configurator_engine::StoreError::Unavailable("lock poisoned".to_string())
}
