/// Tiered cache errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    #[error("{tier} cache tier unavailable: {reason}")]
    Unavailable { tier: String, reason: String },

    #[error("cache value serialization failed for {key}: {reason}")]
    Serialization { key: String, reason: String },

    #[error("computation for {key} failed: {reason}")]
    ComputeFailed { key: String, reason: String },
}

impl CacheError {
    /// Whether the error only signals a degraded tier (callers may fall through).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}
