//! `start_request`/`form_request`/`paginate_request` dispatch (§4.5, §4.6, §4.7).

use std::time::Duration;

use nebula_execution::ExecutionContext;
use nebula_resilience::{Backoff, ResilienceConfig, call_with_resilience, now_ms};
use nebula_workflow::{Graph, Node};
use serde_json::{Map, Value};

use super::{config_i64, config_str, config_u64, render_template};
use crate::EngineDeps;
use crate::error::EngineError;
use crate::http::auth::resolve_auth_header;
use crate::http::executor::HttpRequestSpec;
use crate::http::pagination::{PaginationConfig, PaginationStrategy};
use crate::http::resilience_err_to_engine_err;

/// Renders a node's `headers`/`query`/`body` config against `ctx` and
/// resolves its `authRef`, producing a ready-to-send [`HttpRequestSpec`].
fn build_request(node: &Node, graph: &Graph, ctx: &ExecutionContext) -> Result<HttpRequestSpec, EngineError> {
    let method = config_str(node, "method", "GET");
    let url = render_template(ctx, &config_str(node, "url", ""))?
        .as_str()
        .map_or_else(|| config_str(node, "url", ""), str::to_string);

    let mut headers = Map::new();
    if let Some(configured) = node.config.get("headers").and_then(Value::as_object) {
        for (key, value) in configured {
            let rendered = match value.as_str() {
                Some(s) => render_template(ctx, s)?,
                None => value.clone(),
            };
            headers.insert(key.clone(), rendered);
        }
    }

    if let Some(auth_ref) = node.config.get("authRef").and_then(Value::as_str) {
        let header = resolve_auth_header(graph, auth_ref, &ctx.to_json())?;
        headers.insert(header.name, Value::String(header.value));
    }

    let mut extra_query = Vec::new();
    if let Some(configured) = node.config.get("query").and_then(Value::as_object) {
        for (key, value) in configured {
            let rendered = match value.as_str() {
                Some(s) => render_template(ctx, s)?,
                None => value.clone(),
            };
            let rendered = rendered.as_str().map_or_else(|| rendered.to_string(), str::to_string);
            extra_query.push((key.clone(), rendered));
        }
    }

    let body = match node.config.get("body") {
        None | Some(Value::Null) => Value::Null,
        Some(Value::String(s)) => render_template(ctx, s)?,
        Some(other) => render_json_body(ctx, other)?,
    };

    let timeout = Duration::from_millis(config_u64(node, "timeoutMs", 10_000));

    Ok(HttpRequestSpec {
        method,
        url,
        headers,
        body,
        timeout,
        extra_query,
    })
}

/// Renders every string leaf of a JSON body template, leaving structure intact.
fn render_json_body(ctx: &ExecutionContext, value: &Value) -> Result<Value, EngineError> {
    match value {
        Value::String(s) => render_template(ctx, s),
        Value::Array(items) => {
            let mut rendered = Vec::with_capacity(items.len());
            for item in items {
                rendered.push(render_json_body(ctx, item)?);
            }
            Ok(Value::Array(rendered))
        }
        Value::Object(obj) => {
            let mut rendered = Map::with_capacity(obj.len());
            for (key, v) in obj {
                rendered.insert(key.clone(), render_json_body(ctx, v)?);
            }
            Ok(Value::Object(rendered))
        }
        other => Ok(other.clone()),
    }
}

fn resilience_config(node: &Node) -> ResilienceConfig {
    let backoff = match config_str(node, "backoff", "exponential").as_str() {
        "fixed" => Backoff::Fixed,
        _ => Backoff::Exponential,
    };
    ResilienceConfig {
        retry_attempts: config_i64(node, "retryAttempts", 0).max(0) as u32,
        backoff,
        circuit_failure_threshold: config_i64(node, "circuitFailureThreshold", 5).max(0) as u32,
        circuit_open_ms: config_i64(node, "circuitOpenMs", 30_000),
    }
}

/// `start_request`/`form_request`: a single HTTP call wrapped in retry +
/// circuit breaking, writing `system.last_response` on success.
pub async fn request(
    node: &Node,
    graph: &Graph,
    ctx: &mut ExecutionContext,
    deps: &EngineDeps,
) -> Result<Value, EngineError> {
    let spec = build_request(node, graph, ctx)?;
    let resilience = resilience_config(node);
    let node_id = node.id.clone();
    let executor = &deps.http;

    let breakers = ctx
        .system
        .entry("circuit_breakers")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .expect("system.circuit_breakers is always an object");

    let response = call_with_resilience(breakers, &node_id, &resilience, now_ms, |_attempt| {
        executor.send(&spec)
    })
    .await
    .map_err(|err| resilience_err_to_engine_err(&node_id, err))?;

    let output = response.to_json();
    ctx.set_last_response(&node.id, output.clone());
    Ok(output)
}

/// `paginate_request`: drives the paginator across pages sharing one
/// circuit breaker, writing the accumulated result as `last_response`.
pub async fn paginate(
    node: &Node,
    graph: &Graph,
    ctx: &mut ExecutionContext,
    deps: &EngineDeps,
) -> Result<Value, EngineError> {
    let base_request = build_request(node, graph, ctx)?;
    let resilience = resilience_config(node);

    let strategy = PaginationStrategy::parse(&config_str(node, "strategy", "page_number"))
        .ok_or_else(|| EngineError::ValidationError("paginate_request: unknown strategy".to_string()))?;
    let defaults = PaginationConfig::default();
    let config = PaginationConfig {
        strategy,
        items_path: config_str(node, "itemsPath", &defaults.items_path),
        max_pages: config_i64(node, "maxPages", i64::from(defaults.max_pages)).max(1) as u32,
        page_size: config_u64(node, "pageSize", defaults.page_size),
        next_cursor_path: config_str(node, "nextCursorPath", &defaults.next_cursor_path),
        has_more_path: config_str(node, "hasMorePath", &defaults.has_more_path),
        cursor_param: config_str(node, "cursorParam", &defaults.cursor_param),
        page_param: config_str(node, "pageParam", &defaults.page_param),
        offset_param: config_str(node, "offsetParam", &defaults.offset_param),
        limit_param: config_str(node, "limitParam", &defaults.limit_param),
    };

    let node_id = node.id.clone();
    let breakers = ctx
        .system
        .entry("circuit_breakers")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .expect("system.circuit_breakers is always an object");

    let outcome = crate::http::pagination::run(
        &deps.http,
        breakers,
        &node_id,
        base_request,
        &resilience,
        &config,
    )
    .await?;

    if let Some(last_page) = outcome.last_page {
        ctx.set_last_response(&node.id, last_page);
    }
    Ok(outcome.output)
}
