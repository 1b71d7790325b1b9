//! Error type returned by [`crate::wrapper::call_with_resilience`].

use thiserror::Error;

/// Wraps a caller's upstream error with the one failure mode this crate
/// adds on top: the circuit being open.
#[derive(Debug, Error)]
pub enum ResilienceError<E: std::error::Error + 'static> {
    #[error("circuit breaker open for `{node_id}`")]
    CircuitOpen { node_id: String },
    #[error(transparent)]
    Upstream(E),
}
