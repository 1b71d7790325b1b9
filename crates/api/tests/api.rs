//! End-to-end tests over the `axum` router (§6), exercising the full
//! workflow → version → execution → debug-resume lifecycle against an
//! [`InMemoryStore`](nebula_storage::InMemoryStore).

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use nebula_api::{AppState, Settings, router};
use nebula_storage::InMemoryStore;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> axum::Router {
    let store = Arc::new(InMemoryStore::default());
    router(AppState::new(store, Settings::default()))
}

async fn request(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(v) => Body::from(serde_json::to_vec(&v).unwrap()),
        None => Body::empty(),
    };
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let (status, body) = request(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn branch_and_save_runs_to_completion() {
    let app = app();

    let (status, workflow) = request(
        &app,
        "POST",
        "/workflows",
        Some(json!({ "name": "branch-and-save" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let workflow_id = workflow["id"].as_str().unwrap().to_string();

    let graph = json!({
        "entry_node_id": "start",
        "nodes": [
            { "id": "start", "type": "start" },
            { "id": "branch", "type": "if", "config": { "expression": "true" } },
            { "id": "save", "type": "save", "config": { "key": "result", "from": "input" } },
            { "id": "end", "type": "end" }
        ],
        "edges": [
            { "id": "e1", "source": "start", "target": "branch" },
            { "id": "e2", "source": "branch", "target": "save", "sourceHandle": "true" },
            { "id": "e3", "source": "save", "target": "end" }
        ]
    });

    let (status, version) = request(
        &app,
        "POST",
        &format!("/workflows/{workflow_id}/versions"),
        Some(json!({ "graph_json": graph, "is_published": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let version_id = version["id"].as_str().unwrap().to_string();

    let (status, execution) = request(
        &app,
        "POST",
        "/executions",
        Some(json!({ "workflow_version_id": version_id, "input_json": { "input": "hi" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(execution["status"], "completed");

    let execution_id = execution["id"].as_str().unwrap().to_string();
    let (status, events) = request(&app, "GET", &format!("/executions/{execution_id}/events"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(events.as_array().unwrap().iter().any(|e| e["event_type"] == "RUN_COMPLETED"));
}

#[tokio::test]
async fn breakpoint_pauses_and_resume_continues_to_completion() {
    let app = app();

    let (_, workflow) = request(&app, "POST", "/workflows", Some(json!({ "name": "pausable" }))).await;
    let workflow_id = workflow["id"].as_str().unwrap().to_string();

    let graph = json!({
        "entry_node_id": "start",
        "nodes": [
            { "id": "start", "type": "start" },
            { "id": "end", "type": "end" }
        ],
        "edges": [
            { "id": "e1", "source": "start", "target": "end", "breakpoint": true }
        ]
    });
    let (_, version) = request(
        &app,
        "POST",
        &format!("/workflows/{workflow_id}/versions"),
        Some(json!({ "graph_json": graph, "is_published": true })),
    )
    .await;
    let version_id = version["id"].as_str().unwrap().to_string();

    let (status, execution) = request(
        &app,
        "POST",
        "/executions",
        Some(json!({ "workflow_version_id": version_id, "debug_mode": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(execution["status"], "paused");
    let execution_id = execution["id"].as_str().unwrap().to_string();

    let (status, resumed) = request(
        &app,
        "POST",
        &format!("/executions/{execution_id}/debug/resume"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resumed["status"], "completed");
}

#[tokio::test]
async fn resuming_a_non_paused_execution_conflicts() {
    let app = app();

    let (_, workflow) = request(&app, "POST", "/workflows", Some(json!({ "name": "no-pause" }))).await;
    let workflow_id = workflow["id"].as_str().unwrap().to_string();

    let graph = json!({
        "entry_node_id": "start",
        "nodes": [
            { "id": "start", "type": "start" },
            { "id": "end", "type": "end" }
        ],
        "edges": [ { "id": "e1", "source": "start", "target": "end" } ]
    });
    let (_, version) = request(
        &app,
        "POST",
        &format!("/workflows/{workflow_id}/versions"),
        Some(json!({ "graph_json": graph, "is_published": true })),
    )
    .await;
    let version_id = version["id"].as_str().unwrap().to_string();

    let (_, execution) = request(
        &app,
        "POST",
        "/executions",
        Some(json!({ "workflow_version_id": version_id })),
    )
    .await;
    let execution_id = execution["id"].as_str().unwrap().to_string();

    let (status, _) = request(&app, "POST", &format!("/executions/{execution_id}/debug/resume"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn idempotency_key_dedupes_execution_creation() {
    let app = app();

    let (_, workflow) = request(&app, "POST", "/workflows", Some(json!({ "name": "idempotent" }))).await;
    let workflow_id = workflow["id"].as_str().unwrap().to_string();

    let graph = json!({
        "entry_node_id": "start",
        "nodes": [
            { "id": "start", "type": "start" },
            { "id": "end", "type": "end" }
        ],
        "edges": [ { "id": "e1", "source": "start", "target": "end" } ]
    });
    let (_, version) = request(
        &app,
        "POST",
        &format!("/workflows/{workflow_id}/versions"),
        Some(json!({ "graph_json": graph, "is_published": true })),
    )
    .await;
    let version_id = version["id"].as_str().unwrap().to_string();

    let body = json!({ "workflow_version_id": version_id, "idempotency_key": "once" });
    let (_, first) = request(&app, "POST", "/executions", Some(body.clone())).await;
    let (_, second) = request(&app, "POST", "/executions", Some(body)).await;

    assert_eq!(first["id"], second["id"]);
}

#[tokio::test]
async fn unknown_workflow_is_a_404() {
    let app = app();
    let (status, _) = request(&app, "GET", &format!("/workflows/{}", uuid::Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
