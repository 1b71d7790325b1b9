//! The node dispatcher (§4.7): one function per row of the node-type table,
//! organized as sibling modules and tied together by [`dispatch_node`].

pub mod control_flow;
pub mod http_nodes;
pub mod invoke_node;
pub mod save;
pub mod scripted;
pub mod variables;

use nebula_execution::ExecutionContext;
use nebula_expression::{Template, TemplateRoot, eval_str};
use nebula_workflow::{Graph, Node, NodeType};
use serde_json::{Value, json};

use crate::EngineDeps;
use crate::error::{EngineError, map_expression_error};

/// Dispatches `node`, returning the value stored under `nodes[node_id].output`.
pub async fn dispatch_node(
    node: &Node,
    graph: &Graph,
    ctx: &mut ExecutionContext,
    deps: &EngineDeps,
) -> Result<Value, EngineError> {
    match node.node_type {
        NodeType::Start | NodeType::Auth | NodeType::Parameters => {
            Ok(json!({ "node_type": node.node_type.as_str() }))
        }
        NodeType::End => Ok(json!({ "node_type": node.node_type.as_str() })),
        NodeType::Delay => control_flow::delay(node, ctx).await,
        NodeType::DefineVariable => variables::define_variable(node, ctx),
        NodeType::If => control_flow::evaluate_if(node, ctx),
        NodeType::ForEachParallel => control_flow::for_each_parallel(node, ctx),
        NodeType::Join => control_flow::join(node, ctx),
        NodeType::StartRequest | NodeType::FormRequest => {
            http_nodes::request(node, graph, ctx, deps).await
        }
        NodeType::PaginateRequest => http_nodes::paginate(node, graph, ctx, deps).await,
        NodeType::PythonRequest => scripted::python_request(node, ctx).await,
        NodeType::StartPython => scripted::start_python(node, ctx).await,
        NodeType::InvokeWorkflow => invoke_node::invoke_workflow(node, ctx, deps).await,
        NodeType::Save => save::save(node, ctx, deps).await,
        NodeType::RaiseError => raise_error(node, ctx),
    }
}

fn raise_error(node: &Node, ctx: &ExecutionContext) -> Result<Value, EngineError> {
    let message_src = config_str(node, "message", "");
    let rendered = render_template(ctx, &message_src)?;
    let message = rendered.as_str().map(str::to_string).unwrap_or(rendered.to_string());
    Err(EngineError::NodeRaised(message))
}

/// Builds the read-only template/expression root over `ctx`'s current state.
pub(crate) fn template_root(ctx: &ExecutionContext) -> TemplateRoot<'_> {
    const NULL: Value = Value::Null;
    let input = ctx.vars.get("input").unwrap_or(&NULL);
    let last_response = ctx.system.get("last_response").unwrap_or(&NULL);
    TemplateRoot::new(&ctx.vars, &ctx.nodes, &ctx.system, input, last_response)
}

/// Renders a `{{ }}` template string against `ctx`'s current state.
pub(crate) fn render_template(ctx: &ExecutionContext, src: &str) -> Result<Value, EngineError> {
    let root = template_root(ctx);
    let tpl = Template::parse(src).map_err(map_expression_error)?;
    tpl.render(&root).map_err(map_expression_error)
}

/// Evaluates a full boolean/arithmetic expression against `ctx`'s current state.
pub(crate) fn eval_expression(ctx: &ExecutionContext, src: &str) -> Result<Value, EngineError> {
    let root = template_root(ctx);
    eval_str(&root, src).map_err(map_expression_error)
}

/// Reads a string field from `node.config`, defaulting to `default`.
pub(crate) fn config_str<'a>(node: &'a Node, key: &str, default: &'a str) -> String {
    node.config
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

/// Reads an `i64` field from `node.config`, defaulting to `default`.
pub(crate) fn config_i64(node: &Node, key: &str, default: i64) -> i64 {
    node.config.get(key).and_then(Value::as_i64).unwrap_or(default)
}

/// Reads a `u64` field from `node.config`, defaulting to `default`.
pub(crate) fn config_u64(node: &Node, key: &str, default: u64) -> u64 {
    node.config.get(key).and_then(Value::as_u64).unwrap_or(default)
}

/// Reads a `bool` field from `node.config`, defaulting to `default`.
pub(crate) fn config_bool(node: &Node, key: &str, default: bool) -> bool {
    node.config.get(key).and_then(Value::as_bool).unwrap_or(default)
}
