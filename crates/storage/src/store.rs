//! The abstract persistence boundary (§4.1).
//!
//! `Store` is the only interface the engine depends on for durability.
//! Every operation is transactional with respect to the caller's unit of
//! work; concrete SQL is deliberately not prescribed (§1, "out of scope").
//! One implementation ships in this crate: [`crate::memory::InMemoryStore`].

use async_trait::async_trait;
use nebula_core::{ExecutionId, WorkflowId};
use nebula_execution::{Execution, ExecutionEvent, ExecutionSnapshot, ExecutionStatus, EventType, SavedOutput};
use nebula_workflow::{Workflow, WorkflowVersion};
use serde_json::Value;

use crate::error::StoreError;

/// The engine's sole dependency on durable storage.
#[async_trait]
pub trait Store: Send + Sync {
    /// Persists a freshly authored workflow.
    async fn create_workflow(&self, workflow: Workflow) -> Result<Workflow, StoreError>;

    /// Looks up a workflow by id.
    async fn get_workflow(&self, id: WorkflowId) -> Result<Workflow, StoreError>;

    /// Persists a new, immutable version of a workflow.
    async fn create_workflow_version(&self, version: WorkflowVersion) -> Result<WorkflowVersion, StoreError>;

    /// Looks up one version by its own id.
    async fn get_workflow_version(&self, id: WorkflowId) -> Result<WorkflowVersion, StoreError>;

    /// The highest `version_number` recorded for `workflow_id`, published or not.
    async fn get_latest_workflow_version(&self, workflow_id: WorkflowId) -> Result<WorkflowVersion, StoreError>;

    /// The highest `version_number` with `is_published = true` for `workflow_id`.
    async fn get_latest_published_workflow_version(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<WorkflowVersion, StoreError>;

    /// Persists a new execution row. Callers are responsible for the
    /// idempotency-key dedupe check before calling this — it always inserts.
    async fn create_execution(&self, execution: Execution) -> Result<Execution, StoreError>;

    /// Looks up an execution by id.
    async fn get_execution(&self, id: ExecutionId) -> Result<Execution, StoreError>;

    /// Looks up an execution by its caller-supplied idempotency key, if any
    /// execution was ever created with it. `Ok(None)` (not an error) when
    /// the key is unused.
    async fn get_execution_by_idempotency_key(&self, key: &str) -> Result<Option<Execution>, StoreError>;

    /// Updates `status`, and optionally `current_node_id`/`final_context_json`.
    /// `final_context_json: None` means "do not overwrite" (§4.1).
    async fn update_execution_status(
        &self,
        id: ExecutionId,
        status: ExecutionStatus,
        current_node_id: Option<String>,
        final_context_json: Option<Value>,
    ) -> Result<Execution, StoreError>;

    /// `max(event_index) + 1`, or `0` if no events exist yet.
    async fn get_next_event_index(&self, execution_id: ExecutionId) -> Result<u64, StoreError>;

    /// Assigns the next event index and appends one record. The store is
    /// responsible for serializing concurrent appends to the same
    /// execution (§5) — callers never pass an explicit index.
    async fn append_event(
        &self,
        execution_id: ExecutionId,
        event_type: EventType,
        node_id: Option<String>,
        edge_id: Option<String>,
        payload: Option<Value>,
    ) -> Result<ExecutionEvent, StoreError>;

    /// All events for `execution_id`, ordered by `event_index`.
    async fn list_events(&self, execution_id: ExecutionId) -> Result<Vec<ExecutionEvent>, StoreError>;

    /// Upserts a snapshot at `(execution_id, event_index)`.
    async fn create_snapshot(
        &self,
        execution_id: ExecutionId,
        event_index: u64,
        context_json: Value,
    ) -> Result<(), StoreError>;

    /// The most recent snapshot at or before `event_index`, if one exists.
    async fn get_latest_snapshot_before(
        &self,
        execution_id: ExecutionId,
        event_index: u64,
    ) -> Result<Option<ExecutionSnapshot>, StoreError>;

    /// Appends one row to the `save`-node side channel. Re-using a `key`
    /// within an execution appends another row rather than upserting.
    async fn create_saved_output(
        &self,
        execution_id: ExecutionId,
        key: String,
        value_json: Value,
    ) -> Result<(), StoreError>;

    /// All saved outputs for `execution_id`, in insertion order.
    async fn list_saved_outputs(&self, execution_id: ExecutionId) -> Result<Vec<SavedOutput>, StoreError>;
}
