//! A per-execution circuit breaker stored as plain JSON under
//! `system.circuit_breakers[node_id]`. Deliberately has no internal state of
//! its own — every function is pure, taking and returning the JSON slice —
//! so the breaker travels with the execution's context and survives pause
//! and resume like any other piece of context.

use serde_json::{Map, Value};

/// `{failures, open_until_ms}` for one node, the shape stored in
/// `system.circuit_breakers[node_id]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerState {
    pub failures: u32,
    pub open_until_ms: i64,
}

impl BreakerState {
    const fn closed() -> Self {
        Self {
            failures: 0,
            open_until_ms: 0,
        }
    }

    /// Reads the breaker state for `node_id` out of `breakers`, defaulting
    /// to closed (no failures recorded) when absent or malformed.
    #[must_use]
    pub fn read(breakers: &Map<String, Value>, node_id: &str) -> Self {
        let Some(entry) = breakers.get(node_id) else {
            return Self::closed();
        };
        let failures = entry.get("failures").and_then(Value::as_u64).unwrap_or(0) as u32;
        let open_until_ms = entry.get("open_until_ms").and_then(Value::as_i64).unwrap_or(0);
        Self {
            failures,
            open_until_ms,
        }
    }

    /// Writes this state back into `breakers[node_id]`.
    pub fn write(self, breakers: &mut Map<String, Value>, node_id: &str) {
        breakers.insert(
            node_id.to_string(),
            serde_json::json!({
                "failures": self.failures,
                "open_until_ms": self.open_until_ms,
            }),
        );
    }

    /// True when `now_ms` is still inside the open window.
    #[must_use]
    pub fn is_open(self, now_ms: i64) -> bool {
        self.open_until_ms > now_ms
    }

    /// Records a failed attempt. Trips the breaker — sets `open_until_ms`
    /// to `now_ms + max(open_ms, 100)` — once `failures` reaches
    /// `threshold`, but only when `threshold > 0` (a threshold of `0`
    /// disables the breaker entirely: failures still count, it just never
    /// opens).
    pub fn record_failure(&mut self, threshold: u32, open_ms: i64, now_ms: i64) {
        self.failures += 1;
        if threshold > 0 && self.failures >= threshold {
            self.open_until_ms = now_ms + open_ms.max(100);
        }
    }

    /// Resets to closed after a successful attempt.
    pub fn record_success(&mut self) {
        *self = Self::closed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entry_reads_as_closed() {
        let breakers = Map::new();
        let state = BreakerState::read(&breakers, "http_1");
        assert_eq!(state.failures, 0);
        assert!(!state.is_open(0));
    }

    #[test]
    fn trips_open_once_threshold_is_reached() {
        let mut state = BreakerState::closed();
        state.record_failure(2, 30_000, 1_000);
        assert!(!state.is_open(1_000));
        state.record_failure(2, 30_000, 1_000);
        assert_eq!(state.open_until_ms, 1_000 + 30_000);
        assert!(state.is_open(1_000));
        assert!(!state.is_open(31_001));
    }

    #[test]
    fn zero_threshold_disables_tripping() {
        let mut state = BreakerState::closed();
        for _ in 0..10 {
            state.record_failure(0, 30_000, 1_000);
        }
        assert_eq!(state.open_until_ms, 0);
        assert!(!state.is_open(1_000));
    }

    #[test]
    fn open_window_floors_at_100ms() {
        let mut state = BreakerState::closed();
        state.record_failure(1, 10, 1_000);
        assert_eq!(state.open_until_ms, 1_100);
    }

    #[test]
    fn success_resets_failures_and_open_window() {
        let mut state = BreakerState {
            failures: 4,
            open_until_ms: 5_000,
        };
        state.record_success();
        assert_eq!(state, BreakerState::closed());
    }

    #[test]
    fn round_trips_through_json() {
        let mut breakers = Map::new();
        let mut state = BreakerState::closed();
        state.record_failure(1, 30_000, 1_000);
        state.write(&mut breakers, "http_1");
        let read_back = BreakerState::read(&breakers, "http_1");
        assert_eq!(read_back, state);
    }
}
