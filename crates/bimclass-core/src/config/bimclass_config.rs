//! Top-level configuration with file + environment resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    AggregationConfig, CacheConfig, ClassificationConfig, HashingConfig, ObservabilityConfig,
};
use crate::constants::{MAX_HASH_PRECISION, MAX_SAMPLE_SIZE};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`BIMCLASS_*`)
/// 2. Config file passed to [`BimclassConfig::load`]
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BimclassConfig {
    pub aggregation: AggregationConfig,
    pub hashing: HashingConfig,
    pub cache: CacheConfig,
    pub classification: ClassificationConfig,
    pub observability: ObservabilityConfig,
}

impl BimclassConfig {
    /// Load configuration from an optional TOML file, then apply env overrides
    /// and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    })?;
                toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string. Missing keys keep their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sample_size = self.aggregation.sample_size;
        if sample_size == 0 || sample_size > MAX_SAMPLE_SIZE {
            return Err(invalid(
                "aggregation.sample_size",
                format!("must be between 1 and {MAX_SAMPLE_SIZE}"),
            ));
        }
        if self.aggregation.page_size == 0 {
            return Err(invalid("aggregation.page_size", "must be greater than 0"));
        }
        if self.hashing.precision > MAX_HASH_PRECISION {
            return Err(invalid(
                "hashing.precision",
                format!("must be at most {MAX_HASH_PRECISION}"),
            ));
        }
        if self.cache.local_capacity == 0 {
            return Err(invalid("cache.local_capacity", "must be greater than 0"));
        }
        if self.cache.local_idle_secs == 0 {
            return Err(invalid("cache.local_idle_secs", "must be greater than 0"));
        }
        if self.cache.shared_ttl_secs == 0 {
            return Err(invalid("cache.shared_ttl_secs", "must be greater than 0"));
        }
        if self.cache.lease_ttl_secs == 0 {
            return Err(invalid("cache.lease_ttl_secs", "must be greater than 0"));
        }
        if self.cache.lease_poll_interval_ms == 0 {
            return Err(invalid(
                "cache.lease_poll_interval_ms",
                "must be greater than 0",
            ));
        }
        if self.classification.max_concurrency == 0 {
            return Err(invalid(
                "classification.max_concurrency",
                "must be greater than 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.classification.confidence_threshold) {
            return Err(invalid(
                "classification.confidence_threshold",
                "must be between 0.0 and 1.0",
            ));
        }
        if self.classification.classifier_timeout_secs == 0 {
            return Err(invalid(
                "classification.classifier_timeout_secs",
                "must be greater than 0",
            ));
        }
        // Lease waiters must outlast a live holder's classifier call.
        if self.cache.lease_wait_secs <= self.classification.classifier_timeout_secs {
            return Err(invalid(
                "cache.lease_wait_secs",
                "must be greater than classification.classifier_timeout_secs",
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides.
    /// Unparseable values are ignored and the file/default value is kept.
    fn apply_env_overrides(&mut self) {
        if let Some(v) = env_parse("BIMCLASS_SAMPLE_SIZE") {
            self.aggregation.sample_size = v;
        }
        if let Some(v) = env_parse("BIMCLASS_PAGE_SIZE") {
            self.aggregation.page_size = v;
        }
        if let Some(v) = env_parse("BIMCLASS_HASH_PRECISION") {
            self.hashing.precision = v;
        }
        if let Some(v) = env_parse("BIMCLASS_LOCAL_CAPACITY") {
            self.cache.local_capacity = v;
        }
        if let Some(v) = env_parse("BIMCLASS_LOCAL_IDLE_SECS") {
            self.cache.local_idle_secs = v;
        }
        if let Some(v) = env_parse("BIMCLASS_SHARED_TTL_SECS") {
            self.cache.shared_ttl_secs = v;
        }
        if let Some(v) = env_parse("BIMCLASS_MAX_CONCURRENCY") {
            self.classification.max_concurrency = v;
        }
        if let Some(v) = env_parse("BIMCLASS_CONFIDENCE_THRESHOLD") {
            self.classification.confidence_threshold = v;
        }
        if let Ok(level) = std::env::var("BIMCLASS_LOG_LEVEL") {
            self.observability.log_level = level;
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.into(),
    }
}
