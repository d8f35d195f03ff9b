//! Top-level error surfaced by `classify_batch` and friends.

use super::{AggregationError, CacheError, ClassificationError, ConfigError, PersistenceError};

/// Errors that can fail a whole call into the classification core.
///
/// Only source-of-truth failures and cancellation abort a batch; cache,
/// classifier, and persistence failures are absorbed into the batch result.
/// Their variants exist so the individual subsystems share one result type.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("aggregation error: {0}")]
    Aggregation(#[from] AggregationError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("classification error: {0}")]
    Classification(#[from] ClassificationError),

    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("batch cancelled")]
    Cancelled,
}

impl ClassifyError {
    /// Whether the pattern source could not be queried.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Aggregation(AggregationError::SourceUnavailable { .. })
        )
    }
}

/// Convenience alias used across the workspace.
pub type ClassifyResult<T> = Result<T, ClassifyError>;
