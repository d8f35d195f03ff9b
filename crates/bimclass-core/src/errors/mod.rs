//! Error handling for bimclass.
//! One error enum per subsystem, `thiserror` only.

pub mod aggregation_error;
pub mod cache_error;
pub mod classification_error;
pub mod classify_error;
pub mod config_error;
pub mod persistence_error;

pub use aggregation_error::AggregationError;
pub use cache_error::CacheError;
pub use classification_error::ClassificationError;
pub use classify_error::{ClassifyError, ClassifyResult};
pub use config_error::ConfigError;
pub use persistence_error::PersistenceError;
