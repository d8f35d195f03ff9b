use serde::{Deserialize, Serialize};

use super::defaults;

/// Pattern aggregation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Maximum number of sample records kept per pattern.
    pub sample_size: usize,
    /// Number of record identifiers fetched from the source per round trip.
    pub page_size: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            sample_size: defaults::DEFAULT_SAMPLE_SIZE,
            page_size: defaults::DEFAULT_PAGE_SIZE,
        }
    }
}
