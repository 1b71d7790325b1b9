//! Errors from logger initialization.

/// Errors produced while building or installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// `level` was not a valid `EnvFilter` directive string.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// A global subscriber was already installed.
    #[error("failed to install subscriber: {0}")]
    Init(String),
}
