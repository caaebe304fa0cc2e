use serde::{Deserialize, Serialize};
use thiserror::Error;

use configurator_core::{DomainError, ValueObject};

/// Body circumferences, all in the same unit (typically centimetres).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub chest: f64,
    pub waist: f64,
    pub hips: f64,
}

impl ValueObject for Measurements {}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MeasurementError {
    #[error("{name} must be a finite positive number (got {value})")]
    NotPositive { name: &'static str, value: f64 },

    #[error("tolerance must be within [0, 0.5) (got {0})")]
    Tolerance(f64),
}

impl From<MeasurementError> for DomainError {
    fn from(value: MeasurementError) -> Self {
        DomainError::validation(value.to_string())
    }
}

impl Measurements {
    /// Build validated measurements.
    pub fn new(chest: f64, waist: f64, hips: f64) -> Result<Self, MeasurementError> {
        let m = Self { chest, waist, hips };
        m.validate()?;
        Ok(m)
    }

    pub fn validate(&self) -> Result<(), MeasurementError> {
        for (name, value) in [("chest", self.chest), ("waist", self.waist), ("hips", self.hips)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(MeasurementError::NotPositive { name, value });
            }
        }
        Ok(())
    }
}
