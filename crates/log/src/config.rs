//! Logger configuration.

use serde::{Deserialize, Serialize};

/// Output encoding for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// Multi-line, human-friendly (local development).
    Pretty,
    /// Single-line, human-friendly (CI logs).
    Compact,
    /// Single-line JSON (production log shippers).
    Json,
}

/// Logger initialization options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// An `EnvFilter` directive string, e.g. `"info"` or `"nebula_engine=debug,info"`.
    pub level: String,
    /// Output encoding.
    pub format: Format,
    /// Whether to emit ANSI color codes (ignored for [`Format::Json`]).
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Pretty,
            ansi: true,
        }
    }
}

impl LogConfig {
    /// Builds a config from the `RUST_LOG` environment variable, falling
    /// back to `"info"` pretty-ansi output when unset.
    #[must_use]
    pub fn from_env() -> Self {
        let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let format = match std::env::var("NEBULA_LOG_FORMAT").as_deref() {
            Ok("json") => Format::Json,
            Ok("compact") => Format::Compact,
            _ => Format::Pretty,
        };
        Self {
            level,
            format,
            ansi: std::env::var("NO_COLOR").is_err(),
        }
    }
}
