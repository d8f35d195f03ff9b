/// Pattern aggregation errors.
///
/// An empty identifier set is not represented here: aggregating zero
/// records succeeds with zero patterns.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AggregationError {
    #[error("record source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    #[error("invalid sample size {requested}: must be between 1 and {max}")]
    InvalidSampleSize { requested: usize, max: usize },
}
