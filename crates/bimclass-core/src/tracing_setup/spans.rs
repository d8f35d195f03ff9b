//! Span definitions per operation: batch, aggregation, cache, classification.

/// Create a batch span.
#[macro_export]
macro_rules! batch_span {
    ($batch_id:expr, $element_count:expr, $force_refresh:expr) => {
        tracing::info_span!(
            "bimclass.batch",
            batch_id = %$batch_id,
            elements = $element_count,
            force_refresh = $force_refresh
        )
    };
}

/// Create an aggregation span.
#[macro_export]
macro_rules! aggregation_span {
    ($record_count:expr, $sample_size:expr) => {
        tracing::debug_span!(
            "bimclass.aggregation",
            records = $record_count,
            sample_size = $sample_size
        )
    };
}

/// Create a cache lookup span.
#[macro_export]
macro_rules! cache_span {
    ($key_count:expr) => {
        tracing::debug_span!("bimclass.cache", keys = $key_count)
    };
}

/// Create a classification span.
#[macro_export]
macro_rules! classify_span {
    ($pattern_hash:expr, $classifier:expr) => {
        tracing::debug_span!(
            "bimclass.classify",
            pattern_hash = %$pattern_hash,
            classifier = %$classifier
        )
    };
}

