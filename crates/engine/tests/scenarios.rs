//! The literal end-to-end scenarios (§8) that need a real HTTP stub and
//! therefore don't fit `crates/api`'s router-level tests: pagination, the
//! circuit breaker, sub-workflow success, and the call-depth cap.

mod support;

use std::sync::Arc;

use nebula_core::WorkflowId;
use nebula_engine::dispatch::http_nodes;
use nebula_execution::{ExecutionContext, ExecutionStatus};
use nebula_storage::{InMemoryStore, Store};
use nebula_workflow::{Graph, Node, NodeType};
use serde_json::{Map, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// §8 scenario 3: `page_number` strategy, three pages of two items each.
/// The node's own `query.page` config seeds the first request with
/// `page=1` so every page, including the first, carries an explicit
/// number the stub can match on.
#[tokio::test]
async fn paginator_page_number_walks_until_has_more_is_false() {
    let server = MockServer::start().await;
    for page in 1..=3u32 {
        let has_more = page < 3;
        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": ["item-p-a", "item-p-b"],
                "has_more": has_more,
            })))
            .mount(&server)
            .await;
    }

    let graph = json!({
        "entry_node_id": "page1",
        "nodes": [
            { "id": "page1", "type": "paginate_request", "config": {
                "method": "GET",
                "url": format!("{}/items", server.uri()),
                "query": { "page": "1" },
                "pageSize": 2,
                "maxPages": 10,
                "itemsPath": "body.data",
                "hasMorePath": "body.has_more",
                "strategy": "page_number",
            }},
            { "id": "end", "type": "end" },
        ],
        "edges": [
            { "id": "e1", "source": "page1", "target": "end" },
        ],
    });

    let store: Arc<dyn Store> = Arc::new(InMemoryStore::default());
    let deps = support::deps(store.clone(), 25, 8);
    let execution = support::run_graph(&store, &deps, graph, json!({})).await;

    assert_eq!(execution.status, ExecutionStatus::Completed);
    let ctx = ExecutionContext::from_json(execution.final_context_json.as_ref().unwrap());
    let output = &ctx.nodes["page1"]["output"];
    assert_eq!(output["pages_fetched"], 3);
    assert_eq!(output["items"].as_array().unwrap().len(), 6);
}

/// §8 scenario 4: a node that fails every attempt trips its breaker, and a
/// subsequent dispatch against the same context fails fast with
/// `CircuitOpen` instead of sending another request.
#[tokio::test]
async fn circuit_breaker_opens_after_threshold_and_short_circuits_next_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let node = Node {
        id: "http1".to_string(),
        node_type: NodeType::StartRequest,
        label: "flaky".to_string(),
        config: Map::from_iter([
            ("method".to_string(), json!("GET")),
            ("url".to_string(), json!(format!("{}/flaky", server.uri()))),
            ("retryAttempts".to_string(), json!(2)),
            ("circuitFailureThreshold".to_string(), json!(2)),
        ]),
    };
    let graph = Graph::new(
        "http1".to_string(),
        std::collections::HashMap::from([(node.id.clone(), node.clone())]),
        Vec::new(),
    );

    let store: Arc<dyn Store> = Arc::new(InMemoryStore::default());
    let deps = support::deps(store, 25, 8);
    let mut ctx = ExecutionContext::default();

    let first = http_nodes::request(&node, &graph, &mut ctx, &deps).await;
    assert!(first.is_err());
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    let breaker = &ctx.system["circuit_breakers"]["http1"];
    assert!(breaker["failures"].as_u64().unwrap() >= 2);

    let second = http_nodes::request(&node, &graph, &mut ctx, &deps).await;
    assert!(matches!(second, Err(nebula_engine::EngineError::CircuitOpen { .. })));
    // No additional request reached the stub: the breaker short-circuited.
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

/// §8 scenario 5: `invoke_workflow` by `targetWorkflowId`, recursing into a
/// published child with a single `end` node.
#[tokio::test]
async fn sub_workflow_invocation_succeeds_and_links_parent_and_child() {
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::default());
    let deps = support::deps(store.clone(), 25, 8);

    let child_workflow_id = WorkflowId::v4();
    let child_graph = json!({
        "entry_node_id": "start",
        "nodes": [
            { "id": "start", "type": "start" },
            { "id": "end", "type": "end" },
        ],
        "edges": [{ "id": "e1", "source": "start", "target": "end" }],
    });
    support::publish_version_for(store.as_ref(), child_workflow_id, child_graph).await;

    let parent_graph = json!({
        "entry_node_id": "invoke",
        "nodes": [
            { "id": "invoke", "type": "invoke_workflow", "config": {
                "targetWorkflowId": child_workflow_id.to_string(),
            }},
            { "id": "end", "type": "end" },
        ],
        "edges": [{ "id": "e1", "source": "invoke", "target": "end" }],
    });

    let execution = support::run_graph(&store, &deps, parent_graph, json!({})).await;
    assert_eq!(execution.status, ExecutionStatus::Completed);

    let events = store.list_events(execution.id).await.unwrap();
    let started = events
        .iter()
        .filter(|e| e.event_type == nebula_execution::EventType::InvokeWorkflowStarted)
        .count();
    let succeeded = events
        .iter()
        .filter(|e| e.event_type == nebula_execution::EventType::InvokeWorkflowSucceeded)
        .count();
    assert_eq!(started, 1);
    assert_eq!(succeeded, 1);

    let ctx = ExecutionContext::from_json(execution.final_context_json.as_ref().unwrap());
    let output = &ctx.nodes["invoke"]["output"];
    let child_execution_id: nebula_core::ExecutionId =
        output["child_execution_id"].as_str().unwrap().parse().unwrap();
    let child = store.get_execution(child_execution_id).await.unwrap();
    assert_eq!(child.parent_execution_id, Some(execution.id));
    assert_eq!(child.status, ExecutionStatus::Completed);
    let child_ctx = ExecutionContext::from_json(child.final_context_json.as_ref().unwrap());
    assert_eq!(child_ctx.call_depth(), 1);
}

/// §8 scenario 6: a workflow that invokes itself fails once depth exceeds
/// `max_call_depth`, and the top-level execution's log shows `NODE_FAILED`
/// at the `invoke_workflow` node.
#[tokio::test]
async fn self_invoking_workflow_fails_past_max_call_depth() {
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::default());
    let max_call_depth: u32 = 3;
    let deps = support::deps(store.clone(), 25, max_call_depth);

    let workflow_id = WorkflowId::v4();
    let graph = json!({
        "entry_node_id": "invoke",
        "nodes": [
            { "id": "invoke", "type": "invoke_workflow", "config": {
                "targetWorkflowId": workflow_id.to_string(),
            }},
            { "id": "end", "type": "end" },
        ],
        "edges": [{ "id": "e1", "source": "invoke", "target": "end" }],
    });
    support::publish_version_for(store.as_ref(), workflow_id, graph.clone()).await;

    let execution = support::run_graph(&store, &deps, graph, json!({})).await;
    assert_eq!(execution.status, ExecutionStatus::Failed);

    let events = store.list_events(execution.id).await.unwrap();
    let last = events.last().unwrap();
    assert_eq!(last.event_type, nebula_execution::EventType::NodeFailed);
    assert_eq!(last.node_id.as_deref(), Some("invoke"));
}
