//! Backoff strategies between retry attempts.

use std::time::Duration;

/// How long to wait between a failed attempt and the next retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backoff {
    /// Always `0.2s`.
    Fixed,
    /// `0.2 * 2^(attempt-1)` seconds, capped at `2.5s`.
    Exponential,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential
    }
}

const FIXED: Duration = Duration::from_millis(200);
const EXPONENTIAL_BASE_MS: u64 = 200;
const EXPONENTIAL_CAP: Duration = Duration::from_millis(2_500);

impl Backoff {
    /// `attempt` is 1-indexed: the first retry (after the first failure)
    /// uses `attempt = 1`.
    #[must_use]
    pub fn duration(self, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed => FIXED,
            Backoff::Exponential => {
                let exp = attempt.saturating_sub(1).min(16);
                let millis = EXPONENTIAL_BASE_MS.saturating_mul(1u64 << exp);
                Duration::from_millis(millis).min(EXPONENTIAL_CAP)
            }
        }
    }
}
