//! Streams records from an `IRecordSource` into patterns.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, Instrument};

use bimclass_core::aggregation_span;
use bimclass_core::config::AggregationConfig;
use bimclass_core::constants::MAX_SAMPLE_SIZE;
use bimclass_core::errors::AggregationError;
use bimclass_core::models::Pattern;
use bimclass_core::traits::{IPatternSource, IRecordSource};

use crate::fold::PatternFold;

/// Groups records into patterns by fetching them in pages.
///
/// Only one page of records is resident at a time; each pattern keeps O(1)
/// statistics, a bounded sample heap, and its id list.
pub struct PatternAggregator {
    source: Arc<dyn IRecordSource>,
    page_size: usize,
}

impl PatternAggregator {
    pub fn new(source: Arc<dyn IRecordSource>, config: &AggregationConfig) -> Self {
        Self {
            source,
            page_size: config.page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

#[async_trait]
impl IPatternSource for PatternAggregator {
    async fn get_patterns(
        &self,
        record_ids: &[String],
        sample_size: usize,
    ) -> Result<Vec<Pattern>, AggregationError> {
        if record_ids.is_empty() {
            return Ok(Vec::new());
        }
        if sample_size == 0 || sample_size > MAX_SAMPLE_SIZE {
            return Err(AggregationError::InvalidSampleSize {
                requested: sample_size,
                max: MAX_SAMPLE_SIZE,
            });
        }

        let span = aggregation_span!(record_ids.len(), sample_size);
        async {
            // Fold each identifier once even if the caller repeated it.
            let mut seen: HashSet<&str> = HashSet::with_capacity(record_ids.len());
            let unique: Vec<String> = record_ids
                .iter()
                .filter(|id| seen.insert(id.as_str()))
                .cloned()
                .collect();
            drop(seen);

            let mut fold = PatternFold::new(sample_size);
            for page in unique.chunks(self.page_size) {
                let records = self.source.fetch_records(page).await?;

                let mut pending: HashSet<&str> = page.iter().map(String::as_str).collect();
                for record in records {
                    // Ignore records we did not ask for, and duplicates within the page.
                    if pending.remove(record.id.as_str()) {
                        fold.add(record);
                    }
                }
                debug!(
                    page_len = page.len(),
                    unmatched = pending.len(),
                    folded = fold.records_folded(),
                    "aggregated record page"
                );
            }

            let patterns = fold.finish();
            debug!(
                unique_ids = unique.len(),
                patterns = patterns.len(),
                "aggregation complete"
            );
            Ok(patterns)
        }
        .instrument(span)
        .await
    }
}
