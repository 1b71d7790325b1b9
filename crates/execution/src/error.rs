//! Execution data-model error types.

use thiserror::Error;

use crate::status::ExecutionStatus;

/// Errors surfaced by this crate's bookkeeping types — not node-dispatch or
/// run-loop failures, which live in `nebula-engine::EngineError`.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A status transition is not valid (e.g. resuming a non-`paused` run).
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: ExecutionStatus,
        /// Attempted target status.
        to: ExecutionStatus,
    },

    /// An `idempotency_key` was reused on a create call whose input differs
    /// from the execution already stored under that key.
    #[error("idempotency key already used: {0}")]
    DuplicateIdempotencyKey(String),

    /// A serialization or deserialization error on a persisted JSON field.
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_display() {
        let err = ExecutionError::InvalidTransition {
            from: ExecutionStatus::Running,
            to: ExecutionStatus::Queued,
        };
        assert_eq!(
            err.to_string(),
            "invalid transition from running to queued"
        );
    }

    #[test]
    fn duplicate_idempotency_key_display() {
        let err = ExecutionError::DuplicateIdempotencyKey("abc-123".into());
        assert_eq!(err.to_string(), "idempotency key already used: abc-123");
    }

    #[test]
    fn from_serde_error() {
        let serde_err = serde_json::from_str::<String>("not valid json").unwrap_err();
        let err = ExecutionError::from(serde_err);
        assert!(err.to_string().starts_with("serialization:"));
    }
}
