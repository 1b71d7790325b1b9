//! Auth resolution (§4.6): `authRef` strings of the form `node_id::entry_name`
//! select a named entry declared on an `auth` node's config.

use base64::Engine as _;
use nebula_execution::resolve_path;
use nebula_workflow::{Graph, NodeType};
use serde_json::Value;

use crate::error::EngineError;

/// One resolved header to attach to an outgoing HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeader {
    /// Header name, e.g. `Authorization`.
    pub name: String,
    /// Header value, already formatted for the auth type.
    pub value: String,
}

/// Resolves `auth_ref` (`"<auth_node_id>::<entry_name>"`) against `graph`'s
/// `auth` node configs and the current context, returning the header to
/// attach. `context` is the full `{vars, nodes, system}` document the
/// default token/username/password paths resolve against.
pub fn resolve_auth_header(
    graph: &Graph,
    auth_ref: &str,
    context: &Value,
) -> Result<AuthHeader, EngineError> {
    let (node_id, entry_name) = auth_ref.split_once("::").ok_or_else(|| {
        EngineError::ValidationError(format!(
            "authRef `{auth_ref}` is not of the form `node_id::entry_name`"
        ))
    })?;

    let node = graph.node(node_id).ok_or_else(|| {
        EngineError::ValidationError(format!("authRef `{auth_ref}` names an unknown node"))
    })?;
    if node.node_type != NodeType::Auth {
        return Err(EngineError::ValidationError(format!(
            "authRef `{auth_ref}` does not name an auth node"
        )));
    }

    let entry = node
        .config
        .get("entries")
        .and_then(Value::as_object)
        .and_then(|entries| entries.get(entry_name))
        .ok_or_else(|| {
            EngineError::ValidationError(format!(
                "auth node `{node_id}` declares no entry named `{entry_name}`"
            ))
        })?;

    let auth_type = entry.get("authType").and_then(Value::as_str).unwrap_or("bearer");
    let header_name = entry
        .get("headerName")
        .and_then(Value::as_str)
        .unwrap_or("Authorization")
        .to_string();

    let token_path = entry.get("tokenPath").and_then(Value::as_str).unwrap_or("vars.token");
    let token = resolve_path(context, token_path);
    let token = token.as_str().unwrap_or_default();

    let value = match auth_type {
        "bearer" => {
            if token.to_ascii_lowercase().starts_with("bearer ") {
                token.to_string()
            } else {
                format!("Bearer {token}")
            }
        }
        "api_key" | "apikey" | "key" => token.to_string(),
        "basic" => {
            let username_path = entry
                .get("usernamePath")
                .and_then(Value::as_str)
                .unwrap_or("vars.username");
            let password_path = entry
                .get("passwordPath")
                .and_then(Value::as_str)
                .unwrap_or("vars.password");
            let username = resolve_path(context, username_path);
            let password = resolve_path(context, password_path);
            let username = username.as_str().unwrap_or_default();
            let password = password.as_str().unwrap_or_default();
            let encoded =
                base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
            format!("Basic {encoded}")
        }
        _ => token.to_string(),
    };

    Ok(AuthHeader {
        name: header_name,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_workflow::normalize::normalize_graph;
    use serde_json::json;

    fn graph_with_auth_entry(auth_type: &str) -> Graph {
        let raw = json!({
            "entry_node_id": "auth1",
            "nodes": [
                {"id": "auth1", "type": "auth", "config": {
                    "entries": {
                        "default": {"authType": auth_type, "headerName": "Authorization"}
                    }
                }},
            ],
            "edges": [],
        });
        normalize_graph(&raw).unwrap()
    }

    #[test]
    fn bearer_token_is_prefixed_unless_already_present() {
        let graph = graph_with_auth_entry("bearer");
        let context = json!({"vars": {"token": "abc"}});
        let header = resolve_auth_header(&graph, "auth1::default", &context).unwrap();
        assert_eq!(header.value, "Bearer abc");

        let context = json!({"vars": {"token": "bearer already"}});
        let header = resolve_auth_header(&graph, "auth1::default", &context).unwrap();
        assert_eq!(header.value, "bearer already");
    }

    #[test]
    fn basic_auth_encodes_user_and_pass() {
        let graph = graph_with_auth_entry("basic");
        let context = json!({"vars": {"username": "alice", "password": "secret"}});
        let header = resolve_auth_header(&graph, "auth1::default", &context).unwrap();
        assert_eq!(header.value, format!("Basic {}", base64::engine::general_purpose::STANDARD.encode("alice:secret")));
    }

    #[test]
    fn api_key_passes_token_through() {
        let graph = graph_with_auth_entry("api_key");
        let context = json!({"vars": {"token": "k-123"}});
        let header = resolve_auth_header(&graph, "auth1::default", &context).unwrap();
        assert_eq!(header.value, "k-123");
    }

    #[test]
    fn unknown_entry_is_an_error() {
        let graph = graph_with_auth_entry("bearer");
        let context = json!({});
        assert!(resolve_auth_header(&graph, "auth1::missing", &context).is_err());
    }
}
