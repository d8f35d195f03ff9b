/// Suggestion ledger errors. Logged by the orchestrator, never fatal.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to record suggestion for {pattern_hash}: {reason}")]
    WriteFailed {
        pattern_hash: String,
        reason: String,
    },

    #[error("suggestion ledger unavailable: {reason}")]
    Unavailable { reason: String },
}
