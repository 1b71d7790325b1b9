//! Common error type shared by crates that only need to surface an id-parse
//! failure or a thin wrapping error, without pulling in a domain-specific
//! error enum of their own.

use crate::id::UuidParseError;

/// Errors produced by `nebula-core` itself.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A string could not be parsed into one of the UUID-based id types.
    #[error("invalid id: {0}")]
    InvalidId(#[from] UuidParseError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ExecutionId;

    #[test]
    fn invalid_id_display_wraps_parse_error() {
        let parse_err = ExecutionId::parse("not-a-uuid").unwrap_err();
        let err = CoreError::from(parse_err);
        assert!(err.to_string().starts_with("invalid id:"));
    }
}
