//! The append-only event log: [`EventType`] vocabulary and [`ExecutionEvent`]
//! records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The fixed vocabulary of events the run loop, resume controller, and
/// sub-workflow invoker append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// A fresh run began stepping from its entry node.
    RunStarted,
    /// The run reached an `end` node or a dead end and is `completed`.
    RunCompleted,
    /// A paused run re-entered the loop via `resume`/`step`.
    RunResumed,
    /// A paused run was terminated via `abort`.
    RunAborted,
    /// Dispatch began for a node.
    NodeStarted,
    /// A node's dispatch returned successfully.
    NodeSucceeded,
    /// A node's dispatch raised an error.
    NodeFailed,
    /// An edge with no breakpoint was taken.
    EdgeTraversed,
    /// An edge with `breakpoint: true` was taken; the run is now `paused`.
    BreakpointPaused,
    /// A periodic context snapshot was written.
    SnapshotWritten,
    /// A child execution was created from an `invoke_workflow` node.
    InvokeWorkflowStarted,
    /// A child execution reached `completed`.
    InvokeWorkflowSucceeded,
}

/// One append-only record in an execution's event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionEvent {
    /// Dense, strictly increasing position within this execution's log,
    /// starting at 0.
    pub event_index: u64,
    /// What kind of transition this event records.
    pub event_type: EventType,
    /// The node this event concerns, if any.
    pub node_id: Option<String>,
    /// The edge this event concerns, if any.
    pub edge_id: Option<String>,
    /// Event-type-specific detail, opaque to the store.
    pub payload: Option<Value>,
    /// Wall-clock time the event was appended.
    pub occurred_at: DateTime<Utc>,
}
