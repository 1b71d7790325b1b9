//! Error type returned by parsing, evaluation, and template rendering.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("expression exceeds the node budget ({limit})")]
    TooComplex { limit: usize },

    #[error("unknown function `{0}`")]
    NoSuchFunction(String),

    #[error("`{function}` expects {expected} argument(s), got {got}")]
    ArityMismatch {
        function: String,
        expected: &'static str,
        got: usize,
    },

    #[error("`{function}` cannot be applied to a {type_name} value")]
    TypeMismatch {
        function: &'static str,
        type_name: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("index `{0}` is out of range or not applicable to the indexed value")]
    InvalidIndex(String),
}
