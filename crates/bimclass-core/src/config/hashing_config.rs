use serde::{Deserialize, Serialize};

use super::defaults;

/// Pattern hashing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    /// Decimal places dimension statistics are rounded to before hashing.
    pub precision: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            precision: defaults::DEFAULT_HASH_PRECISION,
        }
    }
}
