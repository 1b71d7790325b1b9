//! `define_variable` dispatch and the `parameters` default-application
//! helper the run loop calls once at fresh-run initialization (§4.7 parameters row, §4.8).

use nebula_execution::{ExecutionContext, resolve_path};
use nebula_workflow::{Graph, Node, NodeType};
use serde_json::{Value, json};

use super::{config_str, template_root};
use crate::error::EngineError;

/// Resolves `source`/`selector` and assigns the result to `vars[name]`.
///
/// Unlike `save.from`, `selector` here is always a plain dotted path — it is
/// never treated as an expression, so a selector containing `==`/`()`-like
/// text still resolves as a literal path lookup.
pub fn define_variable(node: &Node, ctx: &mut ExecutionContext) -> Result<Value, EngineError> {
    let name = config_str(node, "name", "");
    let source = config_str(node, "source", "last_response");
    let selector = config_str(node, "selector", "");
    let default_value = node.config.get("defaultValue").cloned().unwrap_or(Value::Null);

    let resolved = match source.as_str() {
        "last_response" => resolve_path(&ctx.last_response(), &selector),
        "node_output" if selector.is_empty() => template_root(ctx).resolve("nodes"),
        "node_output" => {
            // `node_output` scopes the selector to `nodes.*` directly.
            template_root(ctx).resolve(&format!("nodes.{selector}"))
        }
        _ => template_root(ctx).resolve(&selector),
    };

    let value = if resolved.is_null() { default_value } else { resolved };

    ctx.vars.insert(name.clone(), value.clone());
    Ok(json!({ "name": name, "value": value }))
}

/// Applies every `parameters` node's declared defaults once, at fresh-run
/// initialization. A declared parameter's default is written to
/// `vars[name]` only when `name` is not already present (`setdefault`
/// semantics) — a caller-supplied `input` value always wins.
pub fn apply_parameter_defaults(graph: &Graph, ctx: &mut ExecutionContext) {
    for node in graph.nodes_of_type(NodeType::Parameters) {
        let Some(params) = node.config.get("parameters").and_then(Value::as_array) else {
            continue;
        };
        for param in params {
            let Some(name) = param.get("name").and_then(Value::as_str) else {
                continue;
            };
            if ctx.vars.contains_key(name) {
                continue;
            }
            let default_value = param.get("defaultValue").cloned().unwrap_or(Value::Null);
            ctx.vars.insert(name.to_string(), default_value);
        }
    }
}
