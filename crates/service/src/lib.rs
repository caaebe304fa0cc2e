//! Configurator service: typed request boundary, operation facade and the
//! buyer-side session loader.

pub mod app;
pub mod session;

pub use app::dto::{
    GenerateVariantsRequest, GenerateVariantsResponse, MeasurementsRequest, ResolveSkuResponse,
    SelectionRequest, ShapeResponse,
};
pub use app::errors::ServiceError;
pub use app::services::{ConfiguratorService, ProductSnapshot};
pub use session::{BuyerSession, LoadState, SkuSource};
