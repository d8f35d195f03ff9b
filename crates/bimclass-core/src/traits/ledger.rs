use async_trait::async_trait;

use crate::errors::PersistenceError;
use crate::models::{PatternHash, Suggestion};

/// Advisory-only sink for suggestions.
///
/// Records suggestions; offers no way to apply one to canonical data.
#[async_trait]
pub trait ISuggestionLedger: Send + Sync {
    async fn record(&self, suggestion: &Suggestion) -> Result<(), PersistenceError>;

    async fn exists(&self, pattern_hash: &PatternHash) -> Result<bool, PersistenceError>;
}
