//! The HTTP executor (§4.5): builds and sends one request, independent of
//! retry/circuit-breaking, which `dispatch::http_nodes` layers on top via
//! `nebula_resilience::call_with_resilience`.

use std::time::{Duration, Instant};

use reqwest::{Client, Method};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// A fully-resolved HTTP request: every template in the node config has
/// already been rendered against the current context.
#[derive(Debug, Clone)]
pub struct HttpRequestSpec {
    pub method: String,
    pub url: String,
    pub headers: Map<String, Value>,
    pub body: Value,
    pub timeout: Duration,
    /// Query parameters appended on top of whatever the URL already carries
    /// (used by the paginator's cursor/offset/page params).
    pub extra_query: Vec<(String, String)>,
}

/// One HTTP response, shaped exactly as the dispatcher stores it under
/// `nodes[node_id].output`.
#[derive(Debug, Clone)]
pub struct HttpResponseOutput {
    pub status_code: u16,
    pub headers: Map<String, Value>,
    pub body: Value,
    pub duration_ms: u64,
}

impl HttpResponseOutput {
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "status_code": self.status_code,
            "headers": self.headers,
            "body": self.body,
            "duration_ms": self.duration_ms,
        })
    }
}

/// The failure modes a single attempt can raise; both count as a failure
/// for `call_with_resilience` (§4.5 rule 6: any status ≥ 500 is a failure).
#[derive(Debug, Error)]
pub enum HttpAttemptError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("server error: status {status}")]
    ServerError { status: u16, body: Value },
}

/// A single shared `reqwest::Client`, reused across every HTTP/paginate
/// node in the process.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl Default for HttpExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Sends one request. Returns `Ok` for any status below 500 — a 404 is
    /// a successful dispatch whose output happens to carry an error status,
    /// per §4.5 ("HTTP error responses are returned with their status").
    /// Only transport failures and ≥500 responses are `Err`.
    pub async fn send(&self, spec: &HttpRequestSpec) -> Result<HttpResponseOutput, HttpAttemptError> {
        let method = Method::from_bytes(spec.method.to_uppercase().as_bytes())
            .map_err(|err| HttpAttemptError::Transport(err.to_string()))?;
        let mut url =
            url::Url::parse(&spec.url).map_err(|err| HttpAttemptError::Transport(err.to_string()))?;
        if !spec.extra_query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &spec.extra_query {
                pairs.append_pair(key, value);
            }
        }

        let mut builder = self.client.request(method, url).timeout(spec.timeout);
        let has_content_type = spec
            .headers
            .keys()
            .any(|k| k.eq_ignore_ascii_case("content-type"));
        for (key, value) in &spec.headers {
            let rendered = value.as_str().map_or_else(|| value.to_string(), str::to_string);
            builder = builder.header(key, rendered);
        }

        builder = match &spec.body {
            Value::Null => builder,
            Value::Object(_) | Value::Array(_) => {
                if !has_content_type {
                    builder = builder.header("Content-Type", "application/json");
                }
                builder.json(&spec.body)
            }
            Value::String(s) => builder.body(s.clone()),
            other => builder.body(other.to_string()),
        };

        let started = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|err| HttpAttemptError::Transport(err.to_string()))?;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let status = response.status().as_u16();
        let mut headers = Map::new();
        for (name, value) in response.headers() {
            headers.insert(name.to_string(), json!(value.to_str().unwrap_or_default()));
        }
        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));

        let text = response
            .text()
            .await
            .map_err(|err| HttpAttemptError::Transport(err.to_string()))?;
        let body = if is_json {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        } else {
            Value::String(text)
        };

        if status >= 500 {
            return Err(HttpAttemptError::ServerError { status, body });
        }

        Ok(HttpResponseOutput {
            status_code: status,
            headers,
            body,
            duration_ms,
        })
    }
}
