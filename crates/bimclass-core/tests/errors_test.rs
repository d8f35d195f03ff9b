use bimclass_core::errors::*;

#[test]
fn source_unavailable_carries_reason() {
    let err = AggregationError::SourceUnavailable {
        reason: "connection refused".into(),
    };
    assert!(err.to_string().contains("connection refused"));
}

#[test]
fn cache_unavailable_names_tier() {
    let err = CacheError::Unavailable {
        tier: "shared".into(),
        reason: "timeout".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("shared"));
    assert!(msg.contains("timeout"));
    assert!(err.is_unavailable());
}

#[test]
fn compute_failed_is_not_unavailable() {
    let err = CacheError::ComputeFailed {
        key: "k".into(),
        reason: "boom".into(),
    };
    assert!(!err.is_unavailable());
}

#[test]
fn classification_timeout_carries_secs() {
    let err = ClassificationError::Timeout { secs: 120 };
    assert!(err.to_string().contains("120"));
}

// --- From impls ---

#[test]
fn aggregation_error_converts_to_classify_error() {
    let err: ClassifyError = AggregationError::SourceUnavailable {
        reason: "down".into(),
    }
    .into();
    assert!(err.is_source_unavailable());
}

#[test]
fn persistence_error_converts_to_classify_error() {
    let err: ClassifyError = PersistenceError::Unavailable {
        reason: "read-only".into(),
    }
    .into();
    assert!(matches!(err, ClassifyError::Persistence(_)));
    assert!(!err.is_source_unavailable());
}

#[test]
fn config_error_converts_to_classify_error() {
    let err: ClassifyError = ConfigError::ValidationFailed {
        field: "cache.local_capacity".into(),
        message: "must be greater than 0".into(),
    }
    .into();
    assert!(err.to_string().contains("cache.local_capacity"));
}
