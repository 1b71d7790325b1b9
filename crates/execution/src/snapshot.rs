//! Periodic context snapshots, keyed by the event index they follow.

use nebula_core::ExecutionId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A point-in-time capture of an execution's context. Snapshots are hints
/// for inspection, not required for correct resume — resume always replays
/// from `final_context_json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSnapshot {
    /// The execution this snapshot belongs to.
    pub execution_id: ExecutionId,
    /// The event this snapshot was taken after. Unique together with
    /// `execution_id`; writing the same pair again overwrites (upsert).
    pub event_index: u64,
    /// The `{vars, nodes, system}` context at that point.
    pub context_json: Value,
}
