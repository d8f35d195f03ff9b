use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Classifier invocation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Maximum concurrent classifier calls. Sized to the classifier's rate limit.
    pub max_concurrency: usize,
    /// Suggestions below this confidence lose both codes and become `LowConfidence`.
    pub confidence_threshold: f64,
    /// Per-call classifier timeout in seconds.
    pub classifier_timeout_secs: u64,
}

impl ClassificationConfig {
    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_secs(self.classifier_timeout_secs)
    }
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            max_concurrency: defaults::DEFAULT_MAX_CONCURRENCY,
            confidence_threshold: defaults::DEFAULT_CONFIDENCE_THRESHOLD,
            classifier_timeout_secs: defaults::DEFAULT_CLASSIFIER_TIMEOUT_SECS,
        }
    }
}
