use async_trait::async_trait;

use crate::errors::AggregationError;
use crate::models::RawRecord;

/// Read-only access to raw element records.
#[async_trait]
pub trait IRecordSource: Send + Sync {
    /// Fetch the records for a page of identifiers.
    ///
    /// Identifiers with no record are simply absent from the result.
    async fn fetch_records(&self, ids: &[String]) -> Result<Vec<RawRecord>, AggregationError>;
}
