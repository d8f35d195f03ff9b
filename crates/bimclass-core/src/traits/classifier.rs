use async_trait::async_trait;

use crate::errors::ClassificationError;
use crate::models::{Classification, ClassificationContext, Pattern};

/// The expensive external classifier (LLM-backed or rule-based).
///
/// Treated as slow, untrusted I/O: it may take seconds and may fail.
#[async_trait]
pub trait IClassifier: Send + Sync {
    async fn classify(
        &self,
        pattern: &Pattern,
        context: &ClassificationContext,
    ) -> Result<Classification, ClassificationError>;

    /// Human-readable classifier name.
    fn name(&self) -> &str;
}
