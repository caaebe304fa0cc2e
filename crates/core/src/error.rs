//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures of the configuration engine
/// (validation, lookups, invariants). Infrastructure concerns belong elsewhere.
///
/// A resolver finding *no* SKU is not an error; it is reported as `Ok(None)`.
/// An already existing combination is a store outcome
/// (`configurator_engine::StoreError::Duplicate`), not a domain error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed input (e.g. a variant listed twice, a non-positive measurement).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A product, property or variant referenced by the input does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Stored data breaks a uniqueness invariant (e.g. two SKUs with the same
    /// variant set). Never resolved automatically.
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::IntegrityViolation(msg.into())
    }
}
