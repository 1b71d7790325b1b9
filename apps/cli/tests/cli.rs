//! End-to-end tests against the built `nebula` binary.

use assert_cmd::Command;
use predicates::str::contains;

fn write_graph(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

const MINIMAL_GRAPH: &str = r#"{
  "entry_node_id": "start",
  "nodes": [
    { "id": "start", "type": "start" },
    { "id": "end", "type": "end" }
  ],
  "edges": [
    { "id": "e1", "source": "start", "target": "end" }
  ]
}"#;

#[test]
fn validate_accepts_a_well_formed_graph() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_graph(&dir, "graph.json", MINIMAL_GRAPH);

    Command::cargo_bin("nebula")
        .unwrap()
        .args(["validate", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("2 node(s), 1 edge(s)"));
}

#[test]
fn validate_rejects_a_graph_with_an_unknown_entry_node() {
    let dir = tempfile::tempdir().unwrap();
    let body = r#"{ "entry_node_id": "missing", "nodes": [], "edges": [] }"#;
    let path = write_graph(&dir, "graph.json", body);

    Command::cargo_bin("nebula")
        .unwrap()
        .args(["validate", path.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn run_executes_a_start_to_end_graph_to_completion() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_graph(&dir, "graph.json", MINIMAL_GRAPH);

    Command::cargo_bin("nebula")
        .unwrap()
        .args(["run", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("\"completed\""));
}
