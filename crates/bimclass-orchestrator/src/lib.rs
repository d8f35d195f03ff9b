//! Batch classification over pattern-level caching.
//!
//! `ClassificationOrchestrator::classify_batch` folds element records into
//! patterns, answers what it can from the tiered cache in one batched
//! lookup, and sends only the misses to the classifier. Results are
//! advisory suggestions; nothing here writes canonical classifications.

pub mod ledger;
pub mod options;
pub mod orchestrator;
pub mod phase;

pub use ledger::InMemorySuggestionLedger;
pub use options::BatchOptions;
pub use orchestrator::ClassificationOrchestrator;
pub use phase::{BatchPhase, BatchState, PhaseTransition};
