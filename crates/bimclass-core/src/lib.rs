//! # bimclass-core
//!
//! Foundation crate for pattern-cached element classification.
//! Defines the models, collaborator traits, errors, config, and constants
//! shared by the aggregation, cache, and orchestration crates.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;
pub mod tracing_setup;

// Re-export the most commonly used types at the crate root.
pub use config::BimclassConfig;
pub use errors::{ClassifyError, ClassifyResult};
pub use models::{
    BatchResult, Classification, ClassificationContext, DimensionStats, DimensionSummary,
    LineItem, Pattern, PatternHash, PatternKey, RawRecord, Suggestion, SuggestionStatus,
};
