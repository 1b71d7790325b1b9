//! Errors the [`crate::Store`] boundary can return.

use nebula_core::{ExecutionId, WorkflowId};
use thiserror::Error;

/// Failure modes of a [`crate::Store`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No workflow exists with this id.
    #[error("workflow not found: {0}")]
    WorkflowNotFound(WorkflowId),

    /// No workflow version exists with this id, or a workflow has no
    /// versions at all (for "latest"/"latest published" lookups).
    #[error("workflow version not found: {0}")]
    WorkflowVersionNotFound(String),

    /// No execution exists with this id.
    #[error("execution not found: {0}")]
    ExecutionNotFound(ExecutionId),

    /// An `idempotency_key` was used in a create call but no matching
    /// execution could be found under it (internal consistency failure,
    /// not a user-facing case — the lookup path always checks presence
    /// first).
    #[error("idempotency key not indexed: {0}")]
    IdempotencyKeyNotIndexed(String),

    /// An `append_event` call observed a concurrent writer: the caller's
    /// expected `event_index` no longer matches the store's next index.
    /// The caller's per-execution lock should make this unreachable in the
    /// in-memory implementation; kept for backends with real contention.
    #[error("event index conflict for execution {0}: expected {1}")]
    EventIndexConflict(ExecutionId, u64),

    /// A persisted JSON field failed to (de)serialize.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A backend-specific failure, opaque to the engine.
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}
