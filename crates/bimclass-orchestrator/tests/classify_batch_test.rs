//! End-to-end batch classification against in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use bimclass_cache::InMemorySharedTier;
use bimclass_core::config::BimclassConfig;
use bimclass_core::errors::{AggregationError, ClassifyError};
use bimclass_core::models::{Classification, RawRecord, Suggestion, SuggestionStatus};
use bimclass_core::traits::{IPatternSource, IRecordSource, ISharedCacheTier, ISuggestionLedger};
use bimclass_orchestrator::{BatchOptions, ClassificationOrchestrator};
use bimclass_patterns::{InMemoryRecordSource, PatternAggregator};
use test_fixtures::{
    load_fixture, synthetic_records, FailingLedger, FailingRecordSource, FlakySharedTier,
    RecordBuilder, RecordingLedger, ScriptedClassifier,
};
use tokio_util::sync::CancellationToken;

fn config() -> BimclassConfig {
    let mut config = BimclassConfig::default();
    config.cache.local_capacity = 10_000;
    config
}

struct Harness {
    orchestrator: Arc<ClassificationOrchestrator>,
    classifier: Arc<ScriptedClassifier>,
    shared: Arc<InMemorySharedTier>,
    source: Arc<InMemoryRecordSource>,
    ids: Vec<String>,
}

fn harness_with(
    config: &BimclassConfig,
    records: Vec<RawRecord>,
    classifier: ScriptedClassifier,
    ledger: Arc<dyn ISuggestionLedger>,
) -> Harness {
    let source = Arc::new(InMemoryRecordSource::from_records(records));
    let classifier = Arc::new(classifier);
    let shared = Arc::new(InMemorySharedTier::new());
    let orchestrator = ClassificationOrchestrator::from_record_source(
        config,
        source.clone(),
        classifier.clone(),
        ledger,
        shared.clone(),
    );
    Harness {
        orchestrator: Arc::new(orchestrator),
        classifier,
        shared,
        ids: source.ids(),
        source,
    }
}

fn harness(records: Vec<RawRecord>, classifier: ScriptedClassifier) -> Harness {
    harness_with(&config(), records, classifier, Arc::new(RecordingLedger::new()))
}

#[tokio::test]
async fn empty_batch_is_a_successful_no_op() {
    let h = harness(synthetic_records(10, 2), ScriptedClassifier::new());
    let result = h
        .orchestrator
        .classify_batch(&[], BatchOptions::default())
        .await
        .unwrap();

    assert_eq!(result.total_elements, 0);
    assert_eq!(result.total_patterns, 0);
    assert_eq!(result.cache_hit_rate, 0.0);
    assert!(result.suggestions.is_empty());
    assert!(result.pattern_mapping.is_empty());
    assert_eq!(h.classifier.calls(), 0);
}

#[tokio::test]
async fn unknown_ids_are_reported_as_unmatched() {
    let h = harness(synthetic_records(10, 2), ScriptedClassifier::new());
    let ids: Vec<String> = vec!["ghost-1".into(), "ghost-2".into()];
    let result = h
        .orchestrator
        .classify_batch(&ids, BatchOptions::default())
        .await
        .unwrap();
    assert_eq!(result.total_patterns, 0);
    assert_eq!(result.unmatched_elements, 2);
}

#[tokio::test]
async fn hundred_thousand_elements_with_partially_warm_cache() {
    let config = config();
    let h = harness(synthetic_records(100_000, 523), ScriptedClassifier::new());

    // Warm the cache with 420 of the 523 patterns.
    let aggregator = PatternAggregator::new(h.source.clone(), &config.aggregation);
    let patterns = aggregator
        .get_patterns(&h.ids, config.aggregation.sample_size)
        .await
        .unwrap();
    assert_eq!(patterns.len(), 523);
    for pattern in patterns.iter().take(420) {
        let hash = h.orchestrator.hasher().hash(pattern);
        let seeded = Suggestion::from_classification(
            hash.clone(),
            Classification {
                commodity_code: Some("CC-SEEDED".into()),
                pricing_code: Some("PC-SEEDED".into()),
                line_items: Vec::new(),
                confidence: 0.95,
            },
            0.7,
        );
        h.orchestrator
            .cache()
            .set(hash.as_str(), seeded)
            .await
            .unwrap();
    }

    let result = h
        .orchestrator
        .classify_batch(&h.ids, BatchOptions::default())
        .await
        .unwrap();

    assert_eq!(result.total_elements, 100_000);
    assert_eq!(result.total_patterns, 523);
    assert_eq!(result.cached_patterns, 420);
    assert_eq!(result.newly_classified, 103);
    assert_eq!(result.failed_patterns, 0);
    assert!((result.cache_hit_rate - 0.803).abs() < 0.001);
    assert_eq!(h.classifier.calls(), 103);

    assert_eq!(result.suggestions.len(), 523);
    assert_eq!(result.pattern_mapping.len(), 523);
    let attributed: usize = result.pattern_mapping.values().map(Vec::len).sum();
    assert_eq!(attributed, 100_000);
    let seeded = result
        .suggestions
        .iter()
        .filter(|s| s.commodity_code() == Some("CC-SEEDED"))
        .count();
    assert_eq!(seeded, 420);
}

#[tokio::test]
async fn second_run_is_served_from_cache() {
    let h = harness(synthetic_records(300, 12), ScriptedClassifier::new());
    let first = h
        .orchestrator
        .classify_batch(&h.ids, BatchOptions::default())
        .await
        .unwrap();
    assert_eq!(first.newly_classified, 12);

    let second = h
        .orchestrator
        .classify_batch(&h.ids, BatchOptions::default())
        .await
        .unwrap();
    assert_eq!(second.cached_patterns, 12);
    assert_eq!(second.newly_classified, 0);
    assert_eq!(second.cache_hit_rate, 1.0);
    assert_eq!(h.classifier.calls(), 12);

    let stats = h.orchestrator.cache_stats();
    assert_eq!(stats.hits, 12);
    assert_eq!(stats.misses, 12);
}

#[tokio::test]
async fn classifier_failure_is_isolated_and_never_cached() {
    let ledger = Arc::new(RecordingLedger::new());
    let h = harness_with(
        &config(),
        synthetic_records(90, 3),
        ScriptedClassifier::new().failing_family("Family 0001"),
        ledger.clone(),
    );

    let result = h
        .orchestrator
        .classify_batch(&h.ids, BatchOptions::default())
        .await
        .unwrap();
    assert_eq!(result.total_patterns, 3);
    assert_eq!(result.newly_classified, 2);
    assert_eq!(result.failed_patterns, 1);

    let failed: Vec<&Suggestion> = result.suggestions.iter().filter(|s| s.is_failed()).collect();
    assert_eq!(failed.len(), 1);
    let failed_hash = failed[0].pattern_hash().clone();
    assert_eq!(failed[0].status(), SuggestionStatus::Failed);
    assert!(failed[0]
        .failure_reason()
        .is_some_and(|r| r.contains("scripted failure")));

    assert!(h.orchestrator.cache().get(failed_hash.as_str()).await.is_none());
    assert!(!h.shared.contains(failed_hash.as_str()));
    assert_eq!(ledger.len(), 2, "failed suggestions are not persisted");

    // The failure was not cached, so the next batch retries only that pattern.
    let retry = h
        .orchestrator
        .classify_batch(&h.ids, BatchOptions::default())
        .await
        .unwrap();
    assert_eq!(retry.cached_patterns, 2);
    assert_eq!(retry.failed_patterns, 1);
    assert_eq!(h.classifier.calls_for("Family 0001"), 2);
    assert_eq!(h.classifier.calls_for("Family 0000"), 1);
}

#[tokio::test(start_paused = true)]
async fn force_refresh_reclassifies_everything_and_restarts_ttls() {
    let config = config();
    let h = harness(synthetic_records(200, 8), ScriptedClassifier::new());
    h.orchestrator
        .classify_batch(&h.ids, BatchOptions::default())
        .await
        .unwrap();

    tokio::time::advance(Duration::from_secs(6 * 3600)).await;
    let refreshed = h
        .orchestrator
        .classify_batch(&h.ids, BatchOptions::refresh())
        .await
        .unwrap();

    assert_eq!(refreshed.newly_classified, 8);
    assert_eq!(refreshed.cached_patterns, 0);
    assert_eq!(refreshed.cache_hit_rate, 0.0);
    assert_eq!(h.classifier.calls(), 16);
    for hash in refreshed.pattern_mapping.keys() {
        assert_eq!(
            h.shared.ttl_remaining(hash.as_str()),
            Some(config.cache.shared_ttl())
        );
    }
}

#[tokio::test]
async fn unavailable_source_aborts_the_batch() {
    let source = Arc::new(FailingRecordSource::new());
    let orchestrator = ClassificationOrchestrator::from_record_source(
        &config(),
        source.clone(),
        Arc::new(ScriptedClassifier::new()),
        Arc::new(RecordingLedger::new()),
        Arc::new(InMemorySharedTier::new()),
    );
    let err = orchestrator
        .classify_batch(&["el-1".to_string()], BatchOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_source_unavailable());
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn invalid_sample_size_is_rejected() {
    let h = harness(synthetic_records(10, 2), ScriptedClassifier::new());
    let err = h
        .orchestrator
        .classify_batch(&h.ids, BatchOptions::default().with_sample_size(0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClassifyError::Aggregation(AggregationError::InvalidSampleSize { .. })
    ));
}

#[tokio::test]
async fn persistence_failure_does_not_fail_the_batch() {
    let ledger = Arc::new(FailingLedger::new());
    let h = harness_with(
        &config(),
        synthetic_records(50, 5),
        ScriptedClassifier::new(),
        ledger.clone(),
    );
    let result = h
        .orchestrator
        .classify_batch(&h.ids, BatchOptions::default())
        .await
        .unwrap();
    assert_eq!(result.newly_classified, 5);
    assert_eq!(ledger.attempts(), 5);
    assert_eq!(h.shared.len(), 5);
}

#[tokio::test]
async fn low_confidence_drops_codes() {
    let h = harness(
        synthetic_records(20, 2),
        ScriptedClassifier::new().with_confidence(0.3),
    );
    let result = h
        .orchestrator
        .classify_batch(&h.ids, BatchOptions::default())
        .await
        .unwrap();
    assert_eq!(result.newly_classified, 2);
    for suggestion in &result.suggestions {
        assert_eq!(suggestion.status(), SuggestionStatus::LowConfidence);
        assert_eq!(suggestion.commodity_code(), None);
        assert_eq!(suggestion.pricing_code(), None);
        assert!((suggestion.confidence() - 0.3).abs() < f64::EPSILON);
    }
}

#[tokio::test(start_paused = true)]
async fn slow_classifier_times_out_per_pattern() {
    let mut config = config();
    config.classification.classifier_timeout_secs = 2;
    let h = harness_with(
        &config,
        synthetic_records(30, 3),
        ScriptedClassifier::new().with_delay(Duration::from_secs(10)),
        Arc::new(RecordingLedger::new()),
    );
    let result = h
        .orchestrator
        .classify_batch(&h.ids, BatchOptions::default())
        .await
        .unwrap();
    assert_eq!(result.failed_patterns, 3);
    assert!(result
        .suggestions
        .iter()
        .all(|s| s.failure_reason().is_some_and(|r| r.contains("timed out"))));
    assert_eq!(h.shared.len(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancelled_batch_leaves_nothing_in_flight() {
    let h = harness(
        synthetic_records(40, 4),
        ScriptedClassifier::new().with_delay(Duration::from_secs(60)),
    );
    let token = CancellationToken::new();

    let batch = {
        let orchestrator = Arc::clone(&h.orchestrator);
        let ids = h.ids.clone();
        let token = token.clone();
        tokio::spawn(async move {
            orchestrator
                .classify_batch_with_cancel(&ids, BatchOptions::default(), &token)
                .await
        })
    };
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(h.orchestrator.cache_stats().in_flight, 4);

    token.cancel();
    let err = batch.await.unwrap().unwrap_err();
    assert!(matches!(err, ClassifyError::Cancelled));
    assert_eq!(h.orchestrator.cache_stats().in_flight, 0);
    assert_eq!(h.shared.len(), 0);
}

#[tokio::test(start_paused = true)]
async fn concurrent_batches_classify_each_pattern_once() {
    let ledger = Arc::new(RecordingLedger::new());
    let h = harness_with(
        &config(),
        synthetic_records(120, 6),
        ScriptedClassifier::new().with_delay(Duration::from_millis(500)),
        ledger.clone(),
    );

    let (a, b) = tokio::join!(
        h.orchestrator
            .classify_batch(&h.ids, BatchOptions::default().with_batch_id("a")),
        h.orchestrator
            .classify_batch(&h.ids, BatchOptions::default().with_batch_id("b")),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(h.classifier.calls(), 6);
    assert_eq!(a.newly_classified + b.newly_classified, 12);
    assert_eq!(ledger.len(), 6);
    for (x, y) in a.suggestions.iter().zip(&b.suggestions) {
        assert_eq!(x.pattern_hash(), y.pattern_hash());
        assert_eq!(x.commodity_code(), y.commodity_code());
    }
}

#[tokio::test(start_paused = true)]
async fn queued_classification_does_not_block_other_processes() {
    let mut config = config();
    config.classification.max_concurrency = 1;
    let source = Arc::new(InMemoryRecordSource::from_records([
        RecordBuilder::new("w-1").family("Wall A").build(),
        RecordBuilder::new("w-2").family("Wall B").build(),
    ]));
    let classifier = Arc::new(ScriptedClassifier::new().with_delay(Duration::from_secs(100)));
    let shared = Arc::new(InMemorySharedTier::new());
    let instance = || {
        ClassificationOrchestrator::from_record_source(
            &config,
            source.clone(),
            classifier.clone(),
            Arc::new(RecordingLedger::new()),
            shared.clone(),
        )
    };
    let (process_a, process_b) = (instance(), instance());
    let wall_a = ["w-1".to_string()];
    let wall_b = ["w-2".to_string()];

    // Process A's second batch queues behind its first for the only
    // classifier slot; process B asks for the same pattern meanwhile.
    let (first, queued, other) = tokio::join!(
        process_a.classify_batch(&wall_a, BatchOptions::default()),
        process_a.classify_batch(&wall_b, BatchOptions::default()),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            process_b.classify_batch(&wall_b, BatchOptions::default()).await
        },
    );
    let (first, queued, other) = (first.unwrap(), queued.unwrap(), other.unwrap());

    assert_eq!(classifier.calls_for("Wall A"), 1);
    assert_eq!(classifier.calls_for("Wall B"), 1);
    assert_eq!(first.newly_classified, 1);
    assert_eq!(other.newly_classified, 1);
    assert_eq!(queued.newly_classified, 0);
    assert_eq!(queued.cached_patterns, 1);
    assert_eq!(
        queued.suggestions[0].commodity_code(),
        other.suggestions[0].commodity_code()
    );
}

#[tokio::test]
async fn empty_batch_ignores_sample_size() {
    let h = harness(synthetic_records(10, 2), ScriptedClassifier::new());
    let result = h
        .orchestrator
        .classify_batch(&[], BatchOptions::default().with_sample_size(0))
        .await
        .unwrap();
    assert_eq!(result.total_patterns, 0);
    assert_eq!(result.unmatched_elements, 0);
}

#[tokio::test]
async fn invalidate_forces_one_pattern_to_reclassify() {
    let h = harness(synthetic_records(60, 6), ScriptedClassifier::new());
    let first = h
        .orchestrator
        .classify_batch(&h.ids, BatchOptions::default())
        .await
        .unwrap();

    let target = first.suggestions[0].pattern_hash().clone();
    h.orchestrator.invalidate(&target).await.unwrap();
    h.orchestrator.invalidate(&target).await.unwrap();
    assert!(!h.shared.contains(target.as_str()));

    let second = h
        .orchestrator
        .classify_batch(&h.ids, BatchOptions::default())
        .await
        .unwrap();
    assert_eq!(second.cached_patterns, 5);
    assert_eq!(second.newly_classified, 1);
    assert_eq!(h.classifier.calls(), 7);
}

#[tokio::test]
async fn unreachable_shared_tier_degrades_to_local_and_classifier() {
    let source: Arc<dyn IRecordSource> =
        Arc::new(InMemoryRecordSource::from_records(synthetic_records(40, 4)));
    let shared: Arc<dyn ISharedCacheTier> = Arc::new(FlakySharedTier::down());
    let classifier = Arc::new(ScriptedClassifier::new());
    let orchestrator = ClassificationOrchestrator::from_record_source(
        &config(),
        source,
        classifier.clone(),
        Arc::new(RecordingLedger::new()),
        shared,
    );
    let ids: Vec<String> = (0..40).map(|i| format!("el-{i:07}")).collect();

    let first = orchestrator
        .classify_batch(&ids, BatchOptions::default())
        .await
        .unwrap();
    assert_eq!(first.newly_classified, 4);
    assert!(!orchestrator.drain_degradation_events().is_empty());

    let second = orchestrator
        .classify_batch(&ids, BatchOptions::default())
        .await
        .unwrap();
    assert_eq!(second.cached_patterns, 4);
    assert_eq!(classifier.calls(), 4);
}

#[tokio::test]
async fn fixture_floor_plan_groups_into_patterns() {
    let records: Vec<RawRecord> = load_fixture("records/office_level_2.json");
    let h = harness(records, ScriptedClassifier::new());

    let mut ids = h.ids.clone();
    ids.extend(h.ids.iter().take(3).cloned());
    let result = h
        .orchestrator
        .classify_batch(&ids, BatchOptions::default())
        .await
        .unwrap();

    assert_eq!(result.total_elements, 14);
    assert_eq!(result.total_patterns, 4);
    assert_eq!(result.unmatched_elements, 0);
    let doors = result
        .suggestions
        .iter()
        .find(|s| s.commodity_code() == Some("CC-Single Flush"))
        .unwrap();
    assert_eq!(result.pattern_mapping[doors.pattern_hash()].len(), 4);
}

#[tokio::test]
async fn identical_records_in_separate_batches_share_a_cache_key() {
    let a = RecordBuilder::new("a-1").family("Beam").length(3000.0).build();
    let b = RecordBuilder::new("b-1").family("Beam").length(3000.004).build();
    let h = harness(vec![a, b], ScriptedClassifier::new());

    let first = h
        .orchestrator
        .classify_batch(&["a-1".to_string()], BatchOptions::default())
        .await
        .unwrap();
    let second = h
        .orchestrator
        .classify_batch(&["b-1".to_string()], BatchOptions::default())
        .await
        .unwrap();

    assert_eq!(first.newly_classified, 1);
    assert_eq!(second.cached_patterns, 1);
    assert_eq!(
        first.suggestions[0].pattern_hash(),
        second.suggestions[0].pattern_hash()
    );
}
