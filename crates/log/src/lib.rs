#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Log
//!
//! A thin initialization wrapper around `tracing-subscriber`, shared by
//! every Nebula binary (`nebula-server`, `nebula` CLI). Library crates
//! depend only on the `tracing` facade and never call into this crate —
//! only binaries configure a process-wide subscriber, and only once.

mod config;
mod error;

pub use config::{Format, LogConfig};
pub use error::LogError;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the global `tracing` subscriber from `config`.
///
/// # Errors
///
/// Returns [`LogError::Filter`] if `config.level` is not a valid
/// `tracing_subscriber::EnvFilter` directive string.
pub fn init(config: &LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| LogError::Filter(format!("{}: {e}", config.level)))?;

    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        Format::Pretty => {
            let layer = fmt::layer().with_ansi(config.ansi).pretty();
            registry.with(layer).try_init()
        }
        Format::Compact => {
            let layer = fmt::layer().with_ansi(config.ansi).compact();
            registry.with(layer).try_init()
        }
        Format::Json => {
            let layer = fmt::layer().with_ansi(false).json();
            registry.with(layer).try_init()
        }
    }
    .map_err(|e| LogError::Init(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_filter_directive() {
        let config = LogConfig {
            level: "not a valid directive!!".into(),
            ..LogConfig::default()
        };
        // Calling init() more than once across the test binary would error
        // on the global-subscriber-already-set path instead, so we only
        // assert the filter parse failure shape here via a fresh EnvFilter.
        assert!(EnvFilter::try_new(&config.level).is_err());
    }

    #[test]
    fn default_config_is_pretty_ansi_info() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, Format::Pretty);
        assert!(config.ansi);
    }
}
