//! [`call_with_resilience`]: circuit-breaker + retry/backoff around a single
//! async attempt closure, operating purely on the `system.circuit_breakers`
//! JSON slice the caller owns (§4.5/§4.6 of the HTTP executor contract).

use std::future::Future;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value};

use crate::backoff::Backoff;
use crate::circuit_breaker::BreakerState;
use crate::error::ResilienceError;

/// Tunables read from a node's config (`retryAttempts`, `backoff`,
/// `circuitFailureThreshold`, `circuitOpenMs`).
#[derive(Debug, Clone, Copy)]
pub struct ResilienceConfig {
    /// Additional attempts after the first; total attempts = `retry_attempts + 1`.
    pub retry_attempts: u32,
    pub backoff: Backoff,
    pub circuit_failure_threshold: u32,
    pub circuit_open_ms: i64,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 0,
            backoff: Backoff::Exponential,
            circuit_failure_threshold: 5,
            circuit_open_ms: 30_000,
        }
    }
}

#[must_use]
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Runs `attempt` up to `config.retry_attempts + 1` times, gated by the
/// per-node circuit breaker stored at `breakers[node_id]`. On success the
/// breaker resets; on exhausted retries the breaker records one failure and
/// may trip open. `now_ms` is read fresh on each breaker check so the
/// caller does not need to inject a clock in production, but `now_fn`
/// itself is a parameter for deterministic tests.
pub async fn call_with_resilience<F, Fut, T, E>(
    breakers: &mut Map<String, Value>,
    node_id: &str,
    config: &ResilienceConfig,
    now_fn: impl Fn() -> i64,
    mut attempt: F,
) -> Result<T, ResilienceError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + 'static,
{
    let now = now_fn();
    let mut state = BreakerState::read(breakers, node_id);
    if state.is_open(now) {
        return Err(ResilienceError::CircuitOpen {
            node_id: node_id.to_string(),
        });
    }

    let total_attempts = config.retry_attempts + 1;
    let mut last_err = None;
    for attempt_no in 0..total_attempts {
        match attempt(attempt_no).await {
            Ok(value) => {
                state.record_success();
                state.write(breakers, node_id);
                return Ok(value);
            }
            Err(err) => {
                last_err = Some(err);
                state.record_failure(config.circuit_failure_threshold, config.circuit_open_ms, now_fn());
                let is_last = attempt_no + 1 == total_attempts;
                if !is_last {
                    let retry_number = attempt_no + 1;
                    tokio::time::sleep(config.backoff.duration(retry_number)).await;
                }
            }
        }
    }
    state.write(breakers, node_id);
    Err(ResilienceError::Upstream(
        last_err.expect("loop ran at least once"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("boom")]
    struct Boom;

    #[tokio::test]
    async fn succeeds_on_first_try_and_resets_breaker() {
        let mut breakers = Map::new();
        let config = ResilienceConfig::default();
        let result: Result<i32, ResilienceError<Boom>> =
            call_with_resilience(&mut breakers, "n1", &config, || 1_000, |_| async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
        assert!(!BreakerState::read(&breakers, "n1").is_open(1_000));
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let mut breakers = Map::new();
        let config = ResilienceConfig {
            retry_attempts: 2,
            ..ResilienceConfig::default()
        };
        let calls = AtomicU32::new(0);
        let result: Result<i32, ResilienceError<Boom>> = call_with_resilience(
            &mut breakers,
            "n1",
            &config,
            || 1_000,
            |_attempt| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(Boom)
                    } else {
                        Ok(7)
                    }
                }
            },
        )
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn trips_breaker_after_exhausting_retries() {
        let mut breakers = Map::new();
        let config = ResilienceConfig {
            retry_attempts: 0,
            circuit_failure_threshold: 1,
            circuit_open_ms: 30_000,
            ..ResilienceConfig::default()
        };
        let result: Result<i32, ResilienceError<Boom>> =
            call_with_resilience(&mut breakers, "n1", &config, || 1_000, |_| async { Err(Boom) }).await;
        assert!(result.is_err());
        assert!(BreakerState::read(&breakers, "n1").is_open(1_000));
    }

    #[tokio::test]
    async fn open_breaker_short_circuits_without_calling_attempt() {
        let mut breakers = Map::new();
        BreakerState {
            failures: 5,
            open_until_ms: 5_000,
        }
        .write(&mut breakers, "n1");
        let config = ResilienceConfig::default();
        let calls = AtomicU32::new(0);
        let result: Result<i32, ResilienceError<Boom>> = call_with_resilience(
            &mut breakers,
            "n1",
            &config,
            || 1_000,
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(1) }
            },
        )
        .await;
        assert!(matches!(result, Err(ResilienceError::CircuitOpen { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
