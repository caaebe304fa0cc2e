//! Environment-driven configuration.
//!
//! | variable                          | default  |
//! |-----------------------------------|----------|
//! | `CONFIGURATOR_MAX_COMBINATIONS`   | `10000`  |
//! | `CONFIGURATOR_SHAPE_TOLERANCE`    | `0.10`   |
//! | `CONFIGURATOR_LOG_FORMAT`         | `json`   |
//! | `CONFIGURATOR_CATALOG`            | unset    |

use std::path::PathBuf;

use thiserror::Error;

use configurator_engine::DEFAULT_MAX_COMBINATIONS;
use configurator_fit::{BodyShapeClassifier, DEFAULT_TOLERANCE};
use configurator_observability::LogFormat;

pub const MAX_COMBINATIONS_VAR: &str = "CONFIGURATOR_MAX_COMBINATIONS";
pub const SHAPE_TOLERANCE_VAR: &str = "CONFIGURATOR_SHAPE_TOLERANCE";
pub const LOG_FORMAT_VAR: &str = "CONFIGURATOR_LOG_FORMAT";
pub const CATALOG_VAR: &str = "CONFIGURATOR_CATALOG";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}='{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Upper bound on combinations per generation run.
    pub max_combinations: u64,
    /// Body-shape classifier tolerance band.
    pub shape_tolerance: f64,
    pub log_format: LogFormat,
    /// JSON catalog fixture for the seeding binary.
    pub catalog_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_combinations: DEFAULT_MAX_COMBINATIONS,
            shape_tolerance: DEFAULT_TOLERANCE,
            log_format: LogFormat::default(),
            catalog_path: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Unset or blank variables
    /// keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = get(MAX_COMBINATIONS_VAR) {
            let value: u64 = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(MAX_COMBINATIONS_VAR, &raw, e))?;
            if value == 0 {
                return Err(ConfigError::invalid(
                    MAX_COMBINATIONS_VAR,
                    &raw,
                    "must be at least 1",
                ));
            }
            config.max_combinations = value;
        }

        if let Some(raw) = get(SHAPE_TOLERANCE_VAR) {
            let value: f64 = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(SHAPE_TOLERANCE_VAR, &raw, e))?;
            BodyShapeClassifier::with_tolerance(value)
                .map_err(|e| ConfigError::invalid(SHAPE_TOLERANCE_VAR, &raw, e))?;
            config.shape_tolerance = value;
        }

        if let Some(raw) = get(LOG_FORMAT_VAR) {
            config.log_format = raw
                .parse()
                .map_err(|e| ConfigError::invalid(LOG_FORMAT_VAR, &raw, e))?;
        }

        config.catalog_path = get(CATALOG_VAR).map(PathBuf::from);

        Ok(config)
    }

    /// Classifier using the configured tolerance.
    ///
    /// Fails for an out-of-range tolerance on a hand-built config instead of
    /// falling back to the default.
    pub fn classifier(&self) -> Result<BodyShapeClassifier, ConfigError> {
        BodyShapeClassifier::with_tolerance(self.shape_tolerance).map_err(|e| {
            ConfigError::invalid(SHAPE_TOLERANCE_VAR, &self.shape_tolerance.to_string(), e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(vars: &[(&str, &str)]) -> Result<EngineConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = from(&[]).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_combinations, 10_000);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn reads_every_variable() {
        let config = from(&[
            (MAX_COMBINATIONS_VAR, "250"),
            (SHAPE_TOLERANCE_VAR, "0.05"),
            (LOG_FORMAT_VAR, "pretty"),
            (CATALOG_VAR, "catalog.json"),
        ])
        .unwrap();

        assert_eq!(config.max_combinations, 250);
        assert_eq!(config.shape_tolerance, 0.05);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.catalog_path, Some(PathBuf::from("catalog.json")));
        assert_eq!(config.classifier().unwrap().tolerance(), 0.05);
    }

    #[test]
    fn blank_values_keep_defaults() {
        let config = from(&[(MAX_COMBINATIONS_VAR, "  "), (CATALOG_VAR, "")]).unwrap();
        assert_eq!(config.max_combinations, DEFAULT_MAX_COMBINATIONS);
        assert_eq!(config.catalog_path, None);
    }

    #[test]
    fn malformed_values_name_the_variable() {
        let err = from(&[(MAX_COMBINATIONS_VAR, "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: MAX_COMBINATIONS_VAR, .. }));

        let err = from(&[(MAX_COMBINATIONS_VAR, "0")]).unwrap_err();
        assert!(err.to_string().starts_with(MAX_COMBINATIONS_VAR));

        assert!(from(&[(SHAPE_TOLERANCE_VAR, "0.7")]).is_err());
        assert!(from(&[(LOG_FORMAT_VAR, "xml")]).is_err());
    }

    #[test]
    fn hand_built_tolerance_out_of_range_is_rejected() {
        let config = EngineConfig {
            shape_tolerance: 0.9,
            ..EngineConfig::default()
        };
        let err = config.classifier().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: SHAPE_TOLERANCE_VAR, .. }));
    }
}
