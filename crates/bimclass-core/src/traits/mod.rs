//! Collaborator seams. Everything behind these traits is external to the core.

pub mod classifier;
pub mod ledger;
pub mod pattern_source;
pub mod record_source;
pub mod shared_tier;

pub use classifier::IClassifier;
pub use ledger::ISuggestionLedger;
pub use pattern_source::IPatternSource;
pub use record_source::IRecordSource;
pub use shared_tier::ISharedCacheTier;
