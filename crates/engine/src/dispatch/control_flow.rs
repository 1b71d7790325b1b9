//! `delay`, `if`, `for_each_parallel`, and `join` dispatch (§4.7, §5).

use nebula_execution::ExecutionContext;
use nebula_workflow::{Edge, EdgeCondition, Node};
use serde_json::{Map, Value, json};

use super::{config_i64, config_str, eval_expression};
use crate::error::EngineError;

/// Sleeps for `max(0, ms)` milliseconds.
pub async fn delay(node: &Node, _ctx: &ExecutionContext) -> Result<Value, EngineError> {
    let ms = config_i64(node, "ms", 0).max(0);
    tokio::time::sleep(std::time::Duration::from_millis(ms as u64)).await;
    Ok(json!({ "slept_ms": ms }))
}

/// Evaluates `expression` and coerces the result to a boolean.
pub fn evaluate_if(node: &Node, ctx: &mut ExecutionContext) -> Result<Value, EngineError> {
    let expression = config_str(node, "expression", "false");
    let value = eval_expression(ctx, &expression)?;
    let result = truthy(&value);
    Ok(json!({ "expression": expression, "result": result }))
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Selects the outgoing edge for an `if` node's evaluated result: an edge
/// whose `condition` matches `true`/`false`, falling back to the first
/// outgoing edge (§4.7/§4.8 step 5).
#[must_use]
pub fn select_if_edge<'a>(edges: &[&'a Edge], result: bool) -> Option<&'a Edge> {
    let wanted = if result { EdgeCondition::True } else { EdgeCondition::False };
    edges
        .iter()
        .find(|e| e.condition == Some(wanted))
        .or_else(|| edges.first())
        .copied()
}

/// Resolves `listExpr`, coerces it to a list, and records fan-out intent.
pub fn for_each_parallel(node: &Node, ctx: &mut ExecutionContext) -> Result<Value, EngineError> {
    let list_expr = config_str(node, "listExpr", "[]");
    let item_name = config_str(node, "itemName", "item");
    let resolved = eval_expression(ctx, &list_expr)?;
    let items = coerce_to_list(resolved);
    let count = items.len();

    let record = json!({ "item_name": item_name, "items": items, "count": count });
    *ctx.parallel_mut(&node.id) = record.clone();
    ctx.vars
        .insert(format!("{item_name}_items"), record["items"].clone());

    Ok(record)
}

fn coerce_to_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Merges `system.parallel` per `mergeStrategy` and assigns `vars.joined`.
pub fn join(node: &Node, ctx: &mut ExecutionContext) -> Result<Value, EngineError> {
    let strategy = config_str(node, "mergeStrategy", "collect_list");
    let parallel = ctx.parallel_all();

    let joined = match strategy.as_str() {
        "merge_objects" => {
            let mut merged = Map::new();
            for value in parallel.values() {
                if let Value::Object(obj) = value {
                    merged.extend(obj.clone());
                }
            }
            Value::Object(merged)
        }
        // `collect_list` (default) and `last_write_wins` both yield the raw
        // `{node_id: record}` map; nothing here actually picks "the last
        // write" since each node id already owns exactly one slot.
        _ => Value::Object(parallel.clone()),
    };

    ctx.vars.insert("joined".to_string(), joined.clone());
    Ok(json!({ "merge_strategy": strategy, "joined": joined }))
}
