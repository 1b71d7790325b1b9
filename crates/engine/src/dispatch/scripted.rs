//! `python_request` and `start_python` dispatch (§4.7, §4.10). Despite the
//! node-type names, scripts are authored in JavaScript and run inside
//! `nebula-sandbox`'s embedded QuickJS VM.

use std::time::Duration;

use nebula_execution::ExecutionContext;
use nebula_sandbox::DEFAULT_FUNCTION;
use nebula_workflow::Node;
use serde_json::{Value, json};

use super::{config_str, config_u64};
use crate::error::EngineError;

async fn run_script(node: &Node, ctx: &ExecutionContext) -> Result<Value, EngineError> {
    let source = config_str(node, "script", "");
    let function_name = config_str(node, "functionName", DEFAULT_FUNCTION);
    let timeout = Duration::from_millis(config_u64(node, "timeoutMs", 5_000));
    let context = ctx.to_json();

    tokio::task::spawn_blocking(move || nebula_sandbox::run(&source, &function_name, &context, timeout))
        .await
        .map_err(|err| EngineError::Sandbox(nebula_sandbox::SandboxError::Runtime(err.to_string())))?
        .map_err(EngineError::from)
}

/// Runs the node's script; a result that is not already shaped like an
/// HTTP response (an object carrying `status_code`) is wrapped as one.
pub async fn python_request(node: &Node, ctx: &mut ExecutionContext) -> Result<Value, EngineError> {
    let result = run_script(node, ctx).await?;
    let is_response_shaped = result.as_object().is_some_and(|o| o.contains_key("status_code"));
    let output = if is_response_shaped {
        result
    } else {
        json!({ "status_code": 200, "body": result })
    };
    ctx.set_last_response(&node.id, output.clone());
    Ok(output)
}

/// Runs the node's script and merges its result into `vars`: a `vars` key
/// on the result merges that sub-map; otherwise the whole result object
/// merges directly.
pub async fn start_python(node: &Node, ctx: &mut ExecutionContext) -> Result<Value, EngineError> {
    let result = run_script(node, ctx).await?;

    match result.as_object() {
        Some(obj) if obj.contains_key("vars") => {
            if let Some(vars) = obj.get("vars").and_then(Value::as_object) {
                for (k, v) in vars {
                    ctx.vars.insert(k.clone(), v.clone());
                }
            }
        }
        Some(obj) => {
            for (k, v) in obj {
                ctx.vars.insert(k.clone(), v.clone());
            }
        }
        None => {}
    }

    Ok(result)
}
