//! Value objects shared across the workspace.

pub mod batch_result;
pub mod degradation_event;
pub mod pattern;
pub mod record;
pub mod suggestion;

pub use batch_result::{hit_rate, BatchResult};
pub use degradation_event::DegradationEvent;
pub use pattern::{Dimension, DimensionStats, DimensionSummary, Pattern, PatternHash, PatternKey};
pub use record::RawRecord;
pub use suggestion::{
    Classification, ClassificationContext, LineItem, Suggestion, SuggestionStatus,
};
