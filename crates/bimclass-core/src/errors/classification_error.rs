/// Errors from a single classifier invocation.
///
/// Always isolated to one pattern; never cached.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClassificationError {
    #[error("classifier failed: {reason}")]
    Failed { reason: String },

    #[error("classifier timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("classifier returned an invalid result: {reason}")]
    InvalidResult { reason: String },

    #[error("classification cancelled")]
    Cancelled,
}
