//! A process-wide, in-memory [`Store`] implementation.
//!
//! Every entity lives in a [`dashmap::DashMap`] keyed by its id, giving
//! per-entity locking rather than one global mutex. The event log and
//! snapshot list for a given execution are held behind the *same* shard's
//! lock (one `parking_lot::Mutex<Vec<_>>` per execution id), which is
//! exactly the "per-execution lock stripe" §5 allows as an alternative to
//! a unique-constraint-plus-retry scheme: two appends to different
//! executions never contend, and an append to one execution always
//! observes a consistent `next_event_index` for that execution.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use nebula_core::{ExecutionId, WorkflowId};
use nebula_execution::{Execution, ExecutionEvent, ExecutionSnapshot, ExecutionStatus, EventType, SavedOutput};
use nebula_workflow::{Workflow, WorkflowVersion};
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::StoreError;
use crate::store::Store;

#[derive(Default)]
struct ExecutionLog {
    events: Vec<ExecutionEvent>,
    snapshots: Vec<ExecutionSnapshot>,
    saved_outputs: Vec<SavedOutput>,
}

/// In-memory [`Store`]. Cheap to construct (`InMemoryStore::default()`);
/// cloning shares state via its internal `Arc`-backed maps, matching how
/// the engine expects to pass around `Arc<dyn Store>`.
#[derive(Default)]
pub struct InMemoryStore {
    workflows: DashMap<WorkflowId, Workflow>,
    versions: DashMap<WorkflowId, WorkflowVersion>,
    executions: DashMap<ExecutionId, Execution>,
    idempotency_index: DashMap<String, ExecutionId>,
    logs: DashMap<ExecutionId, Mutex<ExecutionLog>>,
    next_event_index: DashMap<ExecutionId, AtomicU64>,
}

impl InMemoryStore {
    /// Builds an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_workflow(&self, workflow: Workflow) -> Result<Workflow, StoreError> {
        self.workflows.insert(workflow.id, workflow.clone());
        Ok(workflow)
    }

    async fn get_workflow(&self, id: WorkflowId) -> Result<Workflow, StoreError> {
        self.workflows
            .get(&id)
            .map(|w| w.clone())
            .ok_or(StoreError::WorkflowNotFound(id))
    }

    async fn create_workflow_version(&self, version: WorkflowVersion) -> Result<WorkflowVersion, StoreError> {
        // Multiple versions per workflow all share the `versions` map keyed
        // by the *version's own* id; "latest" lookups scan by workflow_id.
        self.versions.insert(version.id, version.clone());
        Ok(version)
    }

    async fn get_workflow_version(&self, id: WorkflowId) -> Result<WorkflowVersion, StoreError> {
        self.versions
            .get(&id)
            .map(|v| v.clone())
            .ok_or_else(|| StoreError::WorkflowVersionNotFound(id.to_string()))
    }

    async fn get_latest_workflow_version(&self, workflow_id: WorkflowId) -> Result<WorkflowVersion, StoreError> {
        self.versions
            .iter()
            .filter(|entry| entry.value().workflow_id == workflow_id)
            .max_by_key(|entry| entry.value().version_number)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::WorkflowVersionNotFound(format!("no versions for workflow {workflow_id}")))
    }

    async fn get_latest_published_workflow_version(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<WorkflowVersion, StoreError> {
        self.versions
            .iter()
            .filter(|entry| entry.value().workflow_id == workflow_id && entry.value().is_published)
            .max_by_key(|entry| entry.value().version_number)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                StoreError::WorkflowVersionNotFound(format!("no published versions for workflow {workflow_id}"))
            })
    }

    async fn create_execution(&self, execution: Execution) -> Result<Execution, StoreError> {
        if let Some(key) = execution.idempotency_key.clone() {
            self.idempotency_index.insert(key, execution.id);
        }
        self.executions.insert(execution.id, execution.clone());
        self.logs.insert(execution.id, Mutex::new(ExecutionLog::default()));
        self.next_event_index.insert(execution.id, AtomicU64::new(0));
        Ok(execution)
    }

    async fn get_execution(&self, id: ExecutionId) -> Result<Execution, StoreError> {
        self.executions
            .get(&id)
            .map(|e| e.clone())
            .ok_or(StoreError::ExecutionNotFound(id))
    }

    async fn get_execution_by_idempotency_key(&self, key: &str) -> Result<Option<Execution>, StoreError> {
        let Some(id) = self.idempotency_index.get(key).map(|e| *e) else {
            return Ok(None);
        };
        self.executions.get(&id).map(|e| Some(e.clone())).ok_or(StoreError::IdempotencyKeyNotIndexed(key.to_string()))
    }

    async fn update_execution_status(
        &self,
        id: ExecutionId,
        status: ExecutionStatus,
        current_node_id: Option<String>,
        final_context_json: Option<Value>,
    ) -> Result<Execution, StoreError> {
        let mut entry = self.executions.get_mut(&id).ok_or(StoreError::ExecutionNotFound(id))?;
        entry.status = status;
        if current_node_id.is_some() {
            entry.current_node_id = current_node_id;
        }
        if let Some(ctx) = final_context_json {
            entry.final_context_json = Some(ctx);
        }
        if status.is_terminal() {
            entry.finished_at = Some(chrono::Utc::now());
        }
        Ok(entry.clone())
    }

    async fn get_next_event_index(&self, execution_id: ExecutionId) -> Result<u64, StoreError> {
        let counter = self
            .next_event_index
            .get(&execution_id)
            .ok_or(StoreError::ExecutionNotFound(execution_id))?;
        Ok(counter.load(Ordering::SeqCst))
    }

    async fn append_event(
        &self,
        execution_id: ExecutionId,
        event_type: EventType,
        node_id: Option<String>,
        edge_id: Option<String>,
        payload: Option<Value>,
    ) -> Result<ExecutionEvent, StoreError> {
        let counter = self
            .next_event_index
            .get(&execution_id)
            .ok_or(StoreError::ExecutionNotFound(execution_id))?;
        let log = self.logs.get(&execution_id).ok_or(StoreError::ExecutionNotFound(execution_id))?;

        // Holding this one shard's mutex across the index-bump and the push
        // is what makes appends to *this* execution atomic with respect to
        // each other; other executions' shards are untouched.
        let mut guard = log.lock();
        let event_index = counter.fetch_add(1, Ordering::SeqCst);
        let event = ExecutionEvent {
            event_index,
            event_type,
            node_id,
            edge_id,
            payload,
            occurred_at: chrono::Utc::now(),
        };
        guard.events.push(event.clone());
        Ok(event)
    }

    async fn list_events(&self, execution_id: ExecutionId) -> Result<Vec<ExecutionEvent>, StoreError> {
        let log = self.logs.get(&execution_id).ok_or(StoreError::ExecutionNotFound(execution_id))?;
        Ok(log.lock().events.clone())
    }

    async fn create_snapshot(
        &self,
        execution_id: ExecutionId,
        event_index: u64,
        context_json: Value,
    ) -> Result<(), StoreError> {
        let log = self.logs.get(&execution_id).ok_or(StoreError::ExecutionNotFound(execution_id))?;
        let mut guard = log.lock();
        if let Some(existing) = guard.snapshots.iter_mut().find(|s| s.event_index == event_index) {
            existing.context_json = context_json;
        } else {
            guard.snapshots.push(ExecutionSnapshot {
                execution_id,
                event_index,
                context_json,
            });
        }
        Ok(())
    }

    async fn get_latest_snapshot_before(
        &self,
        execution_id: ExecutionId,
        event_index: u64,
    ) -> Result<Option<ExecutionSnapshot>, StoreError> {
        let log = self.logs.get(&execution_id).ok_or(StoreError::ExecutionNotFound(execution_id))?;
        let guard = log.lock();
        Ok(guard
            .snapshots
            .iter()
            .filter(|s| s.event_index <= event_index)
            .max_by_key(|s| s.event_index)
            .cloned())
    }

    async fn create_saved_output(
        &self,
        execution_id: ExecutionId,
        key: String,
        value_json: Value,
    ) -> Result<(), StoreError> {
        let log = self.logs.get(&execution_id).ok_or(StoreError::ExecutionNotFound(execution_id))?;
        log.lock().saved_outputs.push(SavedOutput {
            execution_id,
            key,
            value_json,
        });
        Ok(())
    }

    async fn list_saved_outputs(&self, execution_id: ExecutionId) -> Result<Vec<SavedOutput>, StoreError> {
        let log = self.logs.get(&execution_id).ok_or(StoreError::ExecutionNotFound(execution_id))?;
        Ok(log.lock().saved_outputs.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn new_execution() -> Execution {
        Execution::new(ExecutionId::v4(), WorkflowId::v4(), Utc::now(), false, None, None, None, None, None)
    }

    #[tokio::test]
    async fn append_event_assigns_dense_increasing_indices() {
        let store = InMemoryStore::new();
        let exec = new_execution();
        store.create_execution(exec.clone()).await.unwrap();

        let e0 = store.append_event(exec.id, EventType::RunStarted, None, None, None).await.unwrap();
        let e1 = store.append_event(exec.id, EventType::NodeStarted, Some("n1".into()), None, None).await.unwrap();
        assert_eq!(e0.event_index, 0);
        assert_eq!(e1.event_index, 1);

        let events = store.list_events(exec.id).await.unwrap();
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn idempotency_key_resolves_to_existing_execution() {
        let store = InMemoryStore::new();
        let mut exec = new_execution();
        exec.idempotency_key = Some("key-1".into());
        store.create_execution(exec.clone()).await.unwrap();

        let found = store.get_execution_by_idempotency_key("key-1").await.unwrap();
        assert_eq!(found.unwrap().id, exec.id);
        assert!(store.get_execution_by_idempotency_key("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_execution_status_leaves_context_untouched_when_none() {
        let store = InMemoryStore::new();
        let exec = new_execution();
        store.create_execution(exec.clone()).await.unwrap();
        store
            .update_execution_status(exec.id, ExecutionStatus::Paused, Some("n1".into()), Some(json!({"vars": {}})))
            .await
            .unwrap();
        let updated = store
            .update_execution_status(exec.id, ExecutionStatus::Paused, None, None)
            .await
            .unwrap();
        assert_eq!(updated.final_context_json, Some(json!({"vars": {}})));
        assert_eq!(updated.current_node_id, Some("n1".to_string()));
    }

    #[tokio::test]
    async fn get_latest_snapshot_before_selects_the_closest_prior_snapshot() {
        let store = InMemoryStore::new();
        let exec = new_execution();
        store.create_execution(exec.clone()).await.unwrap();
        store.create_snapshot(exec.id, 4, json!({"n": 1})).await.unwrap();
        store.create_snapshot(exec.id, 9, json!({"n": 2})).await.unwrap();

        let snap = store.get_latest_snapshot_before(exec.id, 9).await.unwrap().unwrap();
        assert_eq!(snap.event_index, 9);
        let snap = store.get_latest_snapshot_before(exec.id, 8).await.unwrap().unwrap();
        assert_eq!(snap.event_index, 4);
        assert!(store.get_latest_snapshot_before(exec.id, 3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn latest_published_version_ignores_unpublished_and_older() {
        let store = InMemoryStore::new();
        let workflow_id = WorkflowId::v4();
        let mk = |n: u32, published: bool| WorkflowVersion {
            id: WorkflowId::v4(),
            workflow_id,
            version_number: n,
            graph_json: json!({}),
            version_note: None,
            version_tag: None,
            is_published: published,
            created_by: None,
            created_at: Utc::now(),
        };
        store.create_workflow_version(mk(1, true)).await.unwrap();
        let v2 = mk(2, false);
        store.create_workflow_version(v2.clone()).await.unwrap();
        let v3 = mk(3, true);
        store.create_workflow_version(v3.clone()).await.unwrap();

        let latest = store.get_latest_workflow_version(workflow_id).await.unwrap();
        assert_eq!(latest.id, v3.id);
        let latest_published = store.get_latest_published_workflow_version(workflow_id).await.unwrap();
        assert_eq!(latest_published.id, v3.id);
        assert_ne!(v2.id, latest_published.id);
    }
}
