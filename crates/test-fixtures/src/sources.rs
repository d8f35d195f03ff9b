//! Record source fakes.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use bimclass_core::errors::AggregationError;
use bimclass_core::models::RawRecord;
use bimclass_core::traits::IRecordSource;

/// A record source whose backing store is offline.
#[derive(Debug, Default)]
pub struct FailingRecordSource {
    calls: AtomicUsize,
}

impl FailingRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IRecordSource for FailingRecordSource {
    async fn fetch_records(&self, _ids: &[String]) -> Result<Vec<RawRecord>, AggregationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AggregationError::SourceUnavailable {
            reason: "element index offline".into(),
        })
    }
}
