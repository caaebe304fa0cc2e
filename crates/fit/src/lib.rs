//! Body-shape classification used by the recommendation flow upstream of the
//! configurator.
//!
//! Deterministic rules only (no IO, no model weights).

pub mod measurements;
pub mod shape;

pub use measurements::{Measurements, MeasurementError};
pub use shape::{BodyShapeClassifier, DEFAULT_TOLERANCE, ShapeCategory};
