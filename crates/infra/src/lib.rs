//! Infrastructure layer: storage adapters, configuration, catalog fixtures.

pub mod config;
pub mod fixtures;
pub mod store;


pub use config::{ConfigError, EngineConfig};
pub use fixtures::{CatalogFixture, FixtureError, SeededProduct};
pub use store::{InMemoryCatalogStore, InMemorySkuStore};
