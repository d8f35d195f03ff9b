use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::pattern::PatternHash;
use super::suggestion::Suggestion;

/// Outcome of one `classify_batch` call.
///
/// Read-only report: nothing here can be applied to canonical records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub batch_id: String,
    /// Records folded into patterns.
    pub total_elements: u64,
    pub total_patterns: u64,
    /// Patterns answered by the batched cache lookup.
    pub cached_patterns: u64,
    /// Patterns classified (or joined from an in-flight classification) in this batch.
    pub newly_classified: u64,
    /// Patterns whose classification failed. Never cached.
    pub failed_patterns: u64,
    /// `cached_patterns / total_patterns`, 0 when there are no patterns.
    pub cache_hit_rate: f64,
    /// One suggestion per pattern, sorted by pattern hash.
    pub suggestions: Vec<Suggestion>,
    /// Pattern hash → contributing element identifiers.
    pub pattern_mapping: HashMap<PatternHash, Vec<String>>,
    /// Requested identifiers the record source did not return.
    pub unmatched_elements: u64,
}

impl BatchResult {
    /// The result of a batch with nothing to classify.
    pub fn empty(batch_id: impl Into<String>) -> Self {
        Self {
            batch_id: batch_id.into(),
            total_elements: 0,
            total_patterns: 0,
            cached_patterns: 0,
            newly_classified: 0,
            failed_patterns: 0,
            cache_hit_rate: 0.0,
            suggestions: Vec::new(),
            pattern_mapping: HashMap::new(),
            unmatched_elements: 0,
        }
    }

    /// Find the suggestion for a pattern hash.
    pub fn suggestion_for(&self, hash: &PatternHash) -> Option<&Suggestion> {
        self.suggestions
            .binary_search_by(|s| s.pattern_hash().cmp(hash))
            .ok()
            .map(|i| &self.suggestions[i])
    }
}

/// Hit rate with the zero-denominator case defined as 0.
pub fn hit_rate(hits: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}
