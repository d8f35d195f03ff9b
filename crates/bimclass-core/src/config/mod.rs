//! Configuration for bimclass.
//! TOML-based, resolution order: env (`BIMCLASS_*`) > file > compiled defaults.

pub mod aggregation_config;
pub mod bimclass_config;
pub mod cache_config;
pub mod classification_config;
pub mod defaults;
pub mod hashing_config;
pub mod observability_config;

pub use aggregation_config::AggregationConfig;
pub use bimclass_config::BimclassConfig;
pub use cache_config::CacheConfig;
pub use classification_config::ClassificationConfig;
pub use hashing_config::HashingConfig;
pub use observability_config::ObservabilityConfig;
