//! Suggestion ledger fakes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use bimclass_core::errors::PersistenceError;
use bimclass_core::models::{PatternHash, Suggestion};
use bimclass_core::traits::ISuggestionLedger;

/// Keeps every recorded suggestion in order.
#[derive(Debug, Default)]
pub struct RecordingLedger {
    recorded: Mutex<Vec<Suggestion>>,
}

impl RecordingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<Suggestion> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.recorded.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ISuggestionLedger for RecordingLedger {
    async fn record(&self, suggestion: &Suggestion) -> Result<(), PersistenceError> {
        self.recorded.lock().unwrap().push(suggestion.clone());
        Ok(())
    }

    async fn exists(&self, pattern_hash: &PatternHash) -> Result<bool, PersistenceError> {
        Ok(self
            .recorded
            .lock()
            .unwrap()
            .iter()
            .any(|s| s.pattern_hash() == pattern_hash))
    }
}

/// Rejects every write.
#[derive(Debug, Default)]
pub struct FailingLedger {
    attempts: AtomicUsize,
}

impl FailingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ISuggestionLedger for FailingLedger {
    async fn record(&self, suggestion: &Suggestion) -> Result<(), PersistenceError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(PersistenceError::WriteFailed {
            pattern_hash: suggestion.pattern_hash().to_string(),
            reason: "disk full".into(),
        })
    }

    async fn exists(&self, _pattern_hash: &PatternHash) -> Result<bool, PersistenceError> {
        Err(PersistenceError::Unavailable {
            reason: "disk full".into(),
        })
    }
}
