use async_trait::async_trait;

use crate::errors::AggregationError;
use crate::models::Pattern;

/// Produces patterns covering a set of record identifiers.
///
/// Implemented by the in-process aggregator; a pre-aggregated index can
/// stand in for it.
#[async_trait]
pub trait IPatternSource: Send + Sync {
    /// Group the given records into patterns with at most `sample_size`
    /// samples each. An empty identifier set yields an empty vector.
    async fn get_patterns(
        &self,
        record_ids: &[String],
        sample_size: usize,
    ) -> Result<Vec<Pattern>, AggregationError>;
}
