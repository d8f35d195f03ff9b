//! In-memory suggestion ledger.

use async_trait::async_trait;
use dashmap::DashMap;

use bimclass_core::errors::PersistenceError;
use bimclass_core::models::{PatternHash, Suggestion};
use bimclass_core::traits::ISuggestionLedger;

/// Latest suggestion per pattern hash. Record-only: there is no way to
/// apply a suggestion from here.
#[derive(Debug, Default)]
pub struct InMemorySuggestionLedger {
    suggestions: DashMap<PatternHash, Suggestion>,
}

impl InMemorySuggestionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pattern_hash: &PatternHash) -> Option<Suggestion> {
        self.suggestions.get(pattern_hash).map(|s| s.clone())
    }

    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}

#[async_trait]
impl ISuggestionLedger for InMemorySuggestionLedger {
    async fn record(&self, suggestion: &Suggestion) -> Result<(), PersistenceError> {
        self.suggestions
            .insert(suggestion.pattern_hash().clone(), suggestion.clone());
        Ok(())
    }

    async fn exists(&self, pattern_hash: &PatternHash) -> Result<bool, PersistenceError> {
        Ok(self.suggestions.contains_key(pattern_hash))
    }
}
