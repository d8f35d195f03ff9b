use serde::{Deserialize, Serialize};

/// Per-call options for `classify_batch`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Treat every pattern as a miss, reclassify, and overwrite the cache.
    pub force_refresh: bool,
    /// Overrides `aggregation.sample_size` for this batch.
    pub sample_size: Option<usize>,
    /// Caller-supplied batch id; a UUID is generated when absent.
    pub batch_id: Option<String>,
}

impl BatchOptions {
    pub fn refresh() -> Self {
        Self {
            force_refresh: true,
            ..Self::default()
        }
    }

    pub fn with_batch_id(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = Some(sample_size);
        self
    }
}
