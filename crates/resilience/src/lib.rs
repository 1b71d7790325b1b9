//! # Nebula Resilience
//!
//! Retry/backoff and circuit-breaking for node dispatch, scoped per
//! execution rather than per process: the circuit breaker's entire state
//! is the JSON slice the caller passes in and gets back
//! (`system.circuit_breakers[node_id]`), so it serializes, snapshots, and
//! resumes exactly like the rest of an execution's context.

pub mod backoff;
pub mod circuit_breaker;
pub mod error;
pub mod wrapper;

pub use backoff::Backoff;
pub use circuit_breaker::BreakerState;
pub use error::ResilienceError;
pub use wrapper::{ResilienceConfig, call_with_resilience, now_ms};
