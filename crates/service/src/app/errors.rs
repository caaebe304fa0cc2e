use thiserror::Error;

use configurator_core::DomainError;
use configurator_engine::StoreError;
use configurator_fit::MeasurementError;
use configurator_infra::ConfigError;

/// Error returned by every service operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate combination: {0}")]
    DuplicateCombination(String),

    /// More than one SKU carries the same variant set. Fatal for the calling
    /// flow; never retried.
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl ServiceError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation_error",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::DuplicateCombination(_) => "duplicate_combination",
            ServiceError::IntegrityViolation(_) => "integrity_violation",
            ServiceError::Unavailable(_) => "store_unavailable",
        }
    }

    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, ServiceError::IntegrityViolation(_))
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                ServiceError::Validation(msg)
            }
            DomainError::NotFound(msg) => ServiceError::NotFound(msg),
            DomainError::IntegrityViolation(msg) => ServiceError::IntegrityViolation(msg),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Duplicate(key) => ServiceError::DuplicateCombination(key.to_string()),
            StoreError::Unavailable(msg) => ServiceError::Unavailable(msg),
        }
    }
}

impl From<MeasurementError> for ServiceError {
    fn from(value: MeasurementError) -> Self {
        ServiceError::Validation(value.to_string())
    }
}

impl From<ConfigError> for ServiceError {
    fn from(value: ConfigError) -> Self {
        ServiceError::Validation(value.to_string())
    }
}
