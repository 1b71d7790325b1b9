//! Lexer, parser, and AST for the sandboxed expression language.

pub mod ast;
pub mod lexer;
pub mod parser;

/// Abstract-syntax node budget. An expression whose parsed tree would
/// exceed this many nodes is rejected with `ExpressionError::TooComplex`
/// rather than evaluated.
pub const MAX_EXPRESSION_NODES: usize = 250;
