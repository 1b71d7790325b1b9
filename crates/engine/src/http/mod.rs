//! The HTTP executor, auth resolution, and paginator (§4.5/§4.6).

pub mod auth;
pub mod executor;
pub mod pagination;

use nebula_resilience::ResilienceError;

use crate::error::EngineError;
use executor::HttpAttemptError;

/// Maps the resilience wrapper's outcome onto the engine's error
/// vocabulary: an open breaker becomes `CircuitOpen`, anything else
/// becomes `UpstreamFailure`.
pub(crate) fn resilience_err_to_engine_err(
    node_id: &str,
    err: ResilienceError<HttpAttemptError>,
) -> EngineError {
    match err {
        ResilienceError::CircuitOpen { node_id } => EngineError::CircuitOpen { node_id },
        ResilienceError::Upstream(HttpAttemptError::Transport(message)) => {
            EngineError::UpstreamFailure(message)
        }
        ResilienceError::Upstream(HttpAttemptError::ServerError { status, .. }) => {
            EngineError::UpstreamFailure(format!("node `{node_id}` received status {status}"))
        }
    }
}
