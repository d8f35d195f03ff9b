//! ClassificationOrchestrator: one batch end to end.
//!
//! Aggregate → hash → one batched cache lookup → classify misses with
//! bounded concurrency through the cache's single-flight → assemble.
//! Only a pattern-source failure or cancellation fails the batch. Every other
//! failure is absorbed into the result.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use bimclass_cache::{CacheStats, ComputeMode, ComputeOrigin, TieredCache};
use bimclass_core::config::{AggregationConfig, BimclassConfig, ClassificationConfig};
use bimclass_core::errors::{CacheError, ClassificationError, ClassifyError, ClassifyResult};
use bimclass_core::models::{
    hit_rate, BatchResult, ClassificationContext, DegradationEvent, Pattern, PatternHash,
    Suggestion,
};
use bimclass_core::traits::{
    IClassifier, IPatternSource, IRecordSource, ISharedCacheTier, ISuggestionLedger,
};
use bimclass_core::{batch_span, classify_span};
use bimclass_patterns::{PatternAggregator, PatternHasher};

use crate::options::BatchOptions;
use crate::phase::{BatchPhase, BatchState};

/// What happened to one cache miss.
enum MissOutcome {
    /// Classified by this batch or by a concurrent one it joined.
    Classified(Suggestion),
    /// Filled by someone else between the batched lookup and classification.
    LateHit(Suggestion),
    Failed(Suggestion),
}

pub struct ClassificationOrchestrator {
    patterns: Arc<dyn IPatternSource>,
    classifier: Arc<dyn IClassifier>,
    ledger: Arc<dyn ISuggestionLedger>,
    cache: Arc<TieredCache<Suggestion>>,
    hasher: PatternHasher,
    aggregation: AggregationConfig,
    classification: ClassificationConfig,
    /// Process-wide cap on concurrent classifier calls, shared by all batches.
    classifier_permits: Arc<Semaphore>,
}

impl ClassificationOrchestrator {
    pub fn new(
        config: &BimclassConfig,
        patterns: Arc<dyn IPatternSource>,
        classifier: Arc<dyn IClassifier>,
        ledger: Arc<dyn ISuggestionLedger>,
        cache: Arc<TieredCache<Suggestion>>,
    ) -> Self {
        Self {
            patterns,
            classifier,
            ledger,
            cache,
            hasher: PatternHasher::from_config(&config.hashing),
            aggregation: config.aggregation.clone(),
            classification: config.classification.clone(),
            classifier_permits: Arc::new(Semaphore::new(
                config.classification.max_concurrency.max(1),
            )),
        }
    }

    /// Wire the in-process aggregator over `records` and a fresh tiered cache
    /// over `shared`.
    pub fn from_record_source(
        config: &BimclassConfig,
        records: Arc<dyn IRecordSource>,
        classifier: Arc<dyn IClassifier>,
        ledger: Arc<dyn ISuggestionLedger>,
        shared: Arc<dyn ISharedCacheTier>,
    ) -> Self {
        let aggregator = PatternAggregator::new(records, &config.aggregation);
        let cache = TieredCache::new(&config.cache, shared);
        Self::new(
            config,
            Arc::new(aggregator),
            classifier,
            ledger,
            Arc::new(cache),
        )
    }

    pub fn cache(&self) -> &Arc<TieredCache<Suggestion>> {
        &self.cache
    }

    pub fn hasher(&self) -> &PatternHasher {
        &self.hasher
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop a pattern's cached suggestion from both tiers. Idempotent.
    pub async fn invalidate(&self, pattern_hash: &PatternHash) -> ClassifyResult<()> {
        self.cache.delete(pattern_hash.as_str()).await?;
        info!(pattern_hash = %pattern_hash, "invalidated cached suggestion");
        Ok(())
    }

    /// Cache degradations recorded since the last call.
    pub fn drain_degradation_events(&self) -> Vec<DegradationEvent> {
        self.cache.drain_degradation_events()
    }

    pub async fn classify_batch(
        &self,
        record_ids: &[String],
        options: BatchOptions,
    ) -> ClassifyResult<BatchResult> {
        self.classify_batch_with_cancel(record_ids, options, &CancellationToken::new())
            .await
    }

    /// Classify a batch; `cancel` aborts it at the next suspension point.
    ///
    /// A cancelled batch returns `ClassifyError::Cancelled` and leaves no
    /// in-flight markers behind.
    pub async fn classify_batch_with_cancel(
        &self,
        record_ids: &[String],
        options: BatchOptions,
        cancel: &CancellationToken,
    ) -> ClassifyResult<BatchResult> {
        let batch_id = options
            .batch_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let span = batch_span!(batch_id, record_ids.len(), options.force_refresh);
        self.run_batch(batch_id, record_ids, options, cancel)
            .instrument(span)
            .await
    }

    async fn run_batch(
        &self,
        batch_id: String,
        record_ids: &[String],
        options: BatchOptions,
        cancel: &CancellationToken,
    ) -> ClassifyResult<BatchResult> {
        let mut state = BatchState::new(&batch_id);
        let unique_ids = record_ids.iter().collect::<HashSet<_>>().len() as u64;
        let sample_size = options.sample_size.unwrap_or(self.aggregation.sample_size);

        // Aggregating
        let patterns = cancellable(cancel, self.patterns.get_patterns(record_ids, sample_size))
            .await?
            .inspect_err(|e| warn!(error = %e, "aggregation failed; aborting batch"))?;

        if patterns.is_empty() {
            state.advance(BatchPhase::Done);
            let mut result = BatchResult::empty(batch_id);
            result.unmatched_elements = unique_ids;
            info!(unmatched = unique_ids, "batch produced no patterns");
            return Ok(result);
        }

        let total_elements: u64 = patterns.iter().map(|p| p.element_count).sum();
        let total_patterns = patterns.len() as u64;
        let mut pattern_mapping = HashMap::with_capacity(patterns.len());
        let hashed: Vec<(PatternHash, Pattern)> = patterns
            .into_iter()
            .map(|pattern| {
                let hash = self.hasher.hash(&pattern);
                pattern_mapping.insert(hash.clone(), pattern.element_ids.clone());
                (hash, pattern)
            })
            .collect();

        // LookingUp
        state.advance(BatchPhase::LookingUp);
        let mut suggestions = Vec::with_capacity(hashed.len());
        let mut misses = Vec::new();
        if options.force_refresh {
            debug!(patterns = total_patterns, "force_refresh: skipping cache lookup");
            misses = hashed;
        } else {
            let keys: Vec<String> = hashed.iter().map(|(h, _)| h.as_str().to_string()).collect();
            let mut found = cancellable(cancel, self.cache.get_many(&keys)).await?;
            for (hash, pattern) in hashed {
                match found.remove(hash.as_str()) {
                    Some(hit) => suggestions.push(hit.value),
                    None => misses.push((hash, pattern)),
                }
            }
        }
        let mut cached_patterns = suggestions.len() as u64;

        // Classifying
        state.advance(BatchPhase::Classifying);
        let context = ClassificationContext {
            batch_id: batch_id.clone(),
            force_refresh: options.force_refresh,
        };
        let mode = if options.force_refresh {
            ComputeMode::Refresh
        } else {
            ComputeMode::ReadThrough
        };
        let concurrency = self.classification.max_concurrency.max(1);
        // Futures are inert until polled; collecting them first keeps the
        // stream free of a higher-ranked closure so the batch future is Send.
        let pending: Vec<_> = misses
            .iter()
            .map(|(hash, pattern)| self.resolve_miss(hash, pattern, &context, mode))
            .collect();
        let outcomes: Vec<MissOutcome> = cancellable(
            cancel,
            stream::iter(pending)
            .buffer_unordered(concurrency)
            .collect::<Vec<_>>(),
        )
        .await?;

        // Finalizing
        state.advance(BatchPhase::Finalizing);
        let mut newly_classified = 0u64;
        let mut failed_patterns = 0u64;
        for outcome in outcomes {
            match outcome {
                MissOutcome::Classified(s) => {
                    newly_classified += 1;
                    suggestions.push(s);
                }
                MissOutcome::LateHit(s) => {
                    cached_patterns += 1;
                    suggestions.push(s);
                }
                MissOutcome::Failed(s) => {
                    failed_patterns += 1;
                    suggestions.push(s);
                }
            }
        }
        suggestions.sort_by(|a, b| a.pattern_hash().cmp(b.pattern_hash()));

        let result = BatchResult {
            batch_id,
            total_elements,
            total_patterns,
            cached_patterns,
            newly_classified,
            failed_patterns,
            cache_hit_rate: hit_rate(cached_patterns, total_patterns),
            suggestions,
            pattern_mapping,
            unmatched_elements: unique_ids.saturating_sub(total_elements),
        };
        state.advance(BatchPhase::Done);

        info!(
            elements = result.total_elements,
            patterns = result.total_patterns,
            cached = result.cached_patterns,
            classified = result.newly_classified,
            failed = result.failed_patterns,
            hit_rate = result.cache_hit_rate,
            "batch complete"
        );
        Ok(result)
    }

    async fn resolve_miss(
        &self,
        hash: &PatternHash,
        pattern: &Pattern,
        context: &ClassificationContext,
        mode: ComputeMode,
    ) -> MissOutcome {
        // Queue for a classifier slot before any lease is taken, so a held
        // lease only ever covers the classifier call itself.
        let Ok(_permit) = self.classifier_permits.acquire().await else {
            return MissOutcome::Failed(Suggestion::failed(
                hash.clone(),
                ClassificationError::Cancelled.to_string(),
            ));
        };

        let span = classify_span!(hash, self.classifier.name());
        let outcome = self
            .cache
            .get_or_compute(hash.as_str(), mode, || self.classify(hash, pattern, context))
            .instrument(span)
            .await;

        match outcome {
            Ok(outcome) => match outcome.origin {
                ComputeOrigin::Computed => {
                    if let Err(e) = self.ledger.record(&outcome.value).await {
                        warn!(pattern_hash = %hash, error = %e, "suggestion not persisted");
                    }
                    MissOutcome::Classified(outcome.value)
                }
                ComputeOrigin::Joined => MissOutcome::Classified(outcome.value),
                ComputeOrigin::Cached(tier) => {
                    debug!(pattern_hash = %hash, %tier, "filled concurrently");
                    MissOutcome::LateHit(outcome.value)
                }
            },
            Err(e) => {
                let reason = match e {
                    CacheError::ComputeFailed { reason, .. } => reason,
                    other => other.to_string(),
                };
                warn!(pattern_hash = %hash, reason = %reason, "classification failed");
                MissOutcome::Failed(Suggestion::failed(hash.clone(), reason))
            }
        }
    }

    /// One classifier call under the timeout. The caller holds a permit.
    async fn classify(
        &self,
        hash: &PatternHash,
        pattern: &Pattern,
        context: &ClassificationContext,
    ) -> Result<Suggestion, ClassificationError> {
        let timeout = self.classification.classifier_timeout();
        let classification =
            match tokio::time::timeout(timeout, self.classifier.classify(pattern, context)).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(ClassificationError::Timeout {
                        secs: timeout.as_secs(),
                    })
                }
            };

        Ok(Suggestion::from_classification(
            hash.clone(),
            classification,
            self.classification.confidence_threshold,
        ))
    }
}

/// Race `fut` against the batch's cancellation token.
async fn cancellable<F: Future>(cancel: &CancellationToken, fut: F) -> ClassifyResult<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            info!("batch cancelled");
            Err(ClassifyError::Cancelled)
        }
        out = fut => Ok(out),
    }
}
