//! `save` dispatch (§4.7): records a value under a user-chosen key to the
//! `SavedOutput` side channel and mirrors it into `system.saved_outputs`.

use nebula_execution::ExecutionContext;
use nebula_expression::looks_like_expression;
use nebula_workflow::Node;
use serde_json::{Value, json};

use super::{config_str, eval_expression, template_root};
use crate::EngineDeps;
use crate::error::EngineError;

/// Resolves `from` (or falls back to `last_response`) and persists it under
/// `key` via the store, then mirrors it onto the context for later reads.
pub async fn save(node: &Node, ctx: &mut ExecutionContext, deps: &EngineDeps) -> Result<Value, EngineError> {
    let key = config_str(node, "key", "");
    let from = config_str(node, "from", "");

    let value = if from.is_empty() {
        ctx.last_response()
    } else if looks_like_expression(&from) {
        eval_expression(ctx, &from)?
    } else {
        template_root(ctx).resolve(&from)
    };

    let execution_id = ctx
        .execution_id()
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| EngineError::ValidationError("execution context has no execution_id".to_string()))?;

    deps.store
        .create_saved_output(execution_id, key.clone(), value.clone())
        .await?;
    ctx.mirror_saved_output(&key, &value);

    Ok(json!({ "key": key, "value": value }))
}
