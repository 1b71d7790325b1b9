//! The mutable execution context: `vars`, `nodes`, and `system`.
//!
//! [`ExecutionContext`] is the uniform JSON-shaped state the run loop steps
//! through. It is not itself persisted as a row — the engine serializes it
//! to `final_context_json` on pause/terminate and into [`ExecutionSnapshot`]s
//! periodically (see `nebula-engine::run_loop`).

use nebula_core::ExecutionId;
use serde_json::{Map, Value, json};

/// The three sub-maps that make up one execution's state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionContext {
    /// User-visible named values, including `input`.
    pub vars: Map<String, Value>,
    /// `node_id -> { status, node_type, label, output }` for every node
    /// executed so far. Mutated only by the run loop.
    pub nodes: Map<String, Value>,
    /// Reserved engine-internal fields: `execution_id`, `call_depth`,
    /// `parent_execution_id`, `correlation_id`, `last_response`,
    /// `last_response_node_id`, `circuit_breakers`, `parallel`,
    /// `saved_outputs`.
    pub system: Map<String, Value>,
}

impl ExecutionContext {
    /// Builds the initial context for a fresh run: `vars = deep-copy(input)`
    /// plus `vars.input = deep-copy(input)`, empty `nodes`, and `system`
    /// pre-populated with the reserved fields (§4.8 initialization).
    #[must_use]
    pub fn new_initial(
        execution_id: ExecutionId,
        input: &Map<String, Value>,
        call_depth: u32,
        parent_execution_id: Option<ExecutionId>,
        correlation_id: Option<&str>,
    ) -> Self {
        let mut vars = input.clone();
        vars.insert("input".to_string(), Value::Object(input.clone()));

        let mut system = Map::new();
        system.insert("execution_id".to_string(), json!(execution_id.to_string()));
        system.insert("call_depth".to_string(), json!(call_depth));
        system.insert(
            "parent_execution_id".to_string(),
            parent_execution_id.map_or(Value::Null, |id| json!(id.to_string())),
        );
        system.insert(
            "correlation_id".to_string(),
            correlation_id.map_or(Value::Null, |c| json!(c)),
        );
        system.insert("last_response".to_string(), Value::Null);
        system.insert("last_response_node_id".to_string(), Value::Null);
        system.insert("circuit_breakers".to_string(), Value::Object(Map::new()));
        system.insert("parallel".to_string(), Value::Object(Map::new()));
        system.insert("saved_outputs".to_string(), Value::Object(Map::new()));

        Self {
            vars,
            nodes: Map::new(),
            system,
        }
    }

    /// Reconstructs a context from a previously persisted `final_context_json`
    /// (resume) or snapshot `context_json` (point-in-time inspection). An
    /// absent sub-map defaults to empty rather than erroring.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let obj = value.as_object();
        let sub = |key: &str| -> Map<String, Value> {
            obj.and_then(|o| o.get(key))
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default()
        };
        Self {
            vars: sub("vars"),
            nodes: sub("nodes"),
            system: sub("system"),
        }
    }

    /// Serializes this context to the `{vars, nodes, system}` shape used for
    /// `final_context_json` and snapshot `context_json`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "vars": self.vars,
            "nodes": self.nodes,
            "system": self.system,
        })
    }

    /// This execution's id, as recorded in `system.execution_id` at
    /// initialization.
    #[must_use]
    pub fn execution_id(&self) -> Option<&str> {
        self.system.get("execution_id").and_then(Value::as_str)
    }

    /// The recursion depth recorded in `system.call_depth`.
    #[must_use]
    pub fn call_depth(&self) -> u32 {
        self.system
            .get("call_depth")
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32
    }

    /// Records a node's dispatch outcome under `nodes[node_id]`.
    pub fn record_node(&mut self, node_id: &str, record: Value) {
        self.nodes.insert(node_id.to_string(), record);
    }

    /// Sets `system.last_response` and `system.last_response_node_id`.
    pub fn set_last_response(&mut self, node_id: &str, response: Value) {
        self.system
            .insert("last_response_node_id".to_string(), json!(node_id));
        self.system.insert("last_response".to_string(), response);
    }

    /// The current value of `system.last_response`.
    #[must_use]
    pub fn last_response(&self) -> Value {
        self.system
            .get("last_response")
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Mutable access to one node's circuit-breaker record at
    /// `system.circuit_breakers[node_id]`, creating it with
    /// `{failures: 0, open_until_ms: 0}` if absent.
    pub fn circuit_breaker_mut(&mut self, node_id: &str) -> &mut Value {
        let breakers = self
            .system
            .entry("circuit_breakers")
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .expect("system.circuit_breakers is always an object");
        breakers
            .entry(node_id)
            .or_insert_with(|| json!({"failures": 0, "open_until_ms": 0}))
    }

    /// Appends a saved output to the `system.saved_outputs` mirror.
    pub fn mirror_saved_output(&mut self, key: &str, value: &Value) {
        let saved = self
            .system
            .entry("saved_outputs")
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .expect("system.saved_outputs is always an object");
        saved.insert(key.to_string(), value.clone());
    }

    /// Mutable access to `system.parallel[node_id]`.
    pub fn parallel_mut(&mut self, node_id: &str) -> &mut Value {
        let parallel = self
            .system
            .entry("parallel")
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .expect("system.parallel is always an object");
        parallel
            .entry(node_id)
            .or_insert_with(|| Value::Object(Map::new()))
    }

    /// All of `system.parallel`, for `join`.
    #[must_use]
    pub fn parallel_all(&self) -> Map<String, Value> {
        self.system
            .get("parallel")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn execution_id() -> ExecutionId {
        ExecutionId::v4()
    }

    #[test]
    fn new_initial_copies_input_into_vars_and_vars_input() {
        let mut input = Map::new();
        input.insert("amount".to_string(), json!(80));
        let ctx = ExecutionContext::new_initial(execution_id(), &input, 0, None, None);

        assert_eq!(ctx.vars.get("amount"), Some(&json!(80)));
        assert_eq!(ctx.vars.get("input"), Some(&json!({"amount": 80})));
        assert!(ctx.nodes.is_empty());
    }

    #[test]
    fn new_initial_populates_system_reserved_fields() {
        let input = Map::new();
        let parent = execution_id();
        let ctx =
            ExecutionContext::new_initial(execution_id(), &input, 2, Some(parent), Some("corr-1"));

        assert_eq!(ctx.call_depth(), 2);
        assert_eq!(
            ctx.system.get("parent_execution_id"),
            Some(&json!(parent.to_string()))
        );
        assert_eq!(ctx.system.get("correlation_id"), Some(&json!("corr-1")));
        assert_eq!(ctx.system.get("circuit_breakers"), Some(&json!({})));
    }

    #[test]
    fn round_trips_through_json() {
        let input = Map::new();
        let mut ctx = ExecutionContext::new_initial(execution_id(), &input, 0, None, None);
        ctx.vars.insert("x".to_string(), json!(1));
        ctx.record_node("n1", json!({"status": "success"}));

        let restored = ExecutionContext::from_json(&ctx.to_json());
        assert_eq!(restored.vars.get("x"), Some(&json!(1)));
        assert_eq!(
            restored.nodes.get("n1"),
            Some(&json!({"status": "success"}))
        );
    }

    #[test]
    fn from_json_defaults_missing_submaps_to_empty() {
        let ctx = ExecutionContext::from_json(&json!({}));
        assert!(ctx.vars.is_empty());
        assert!(ctx.nodes.is_empty());
        assert!(ctx.system.is_empty());
    }

    #[test]
    fn circuit_breaker_mut_creates_default_record() {
        let input = Map::new();
        let mut ctx = ExecutionContext::new_initial(execution_id(), &input, 0, None, None);
        let record = ctx.circuit_breaker_mut("http1");
        assert_eq!(record, &json!({"failures": 0, "open_until_ms": 0}));
    }

    #[test]
    fn set_last_response_updates_both_fields() {
        let input = Map::new();
        let mut ctx = ExecutionContext::new_initial(execution_id(), &input, 0, None, None);
        ctx.set_last_response("http1", json!({"status_code": 200}));
        assert_eq!(ctx.last_response(), json!({"status_code": 200}));
        assert_eq!(
            ctx.system.get("last_response_node_id"),
            Some(&json!("http1"))
        );
    }

    #[test]
    fn mirror_saved_output_inserts_into_system() {
        let input = Map::new();
        let mut ctx = ExecutionContext::new_initial(execution_id(), &input, 0, None, None);
        ctx.mirror_saved_output("approved", &json!(true));
        assert_eq!(
            ctx.system.get("saved_outputs"),
            Some(&json!({"approved": true}))
        );
    }
}
