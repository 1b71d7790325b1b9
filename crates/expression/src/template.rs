//! `{{ expr }}` template rendering. Templates recurse structurally into
//! objects and arrays; every rendered template yields a `String`, whether
//! the source is a lone `{{ expr }}` segment or text with segments spliced
//! in — only [`render_value`]'s structural recursion preserves non-string
//! JSON types, for leaves that aren't themselves template strings.

use serde_json::Value;

use crate::context::TemplateRoot;
use crate::core::ast::Expr;
use crate::core::parser;
use crate::error::ExpressionError;
use crate::eval;

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Static(String),
    Expr(Expr),
}

/// A template split into static text and parsed `{{ }}` expressions, ready
/// to render against any [`TemplateRoot`] without re-parsing.
#[derive(Debug, Clone)]
pub struct Template {
    parts: Vec<Part>,
    /// `Some` only when the whole source was a single `{{ expr }}` segment
    /// with no surrounding text.
    single_expr: Option<Expr>,
}

impl Template {
    /// Parses `src`. Unbalanced `{{`/`}}` is a syntax error.
    pub fn parse(src: &str) -> Result<Self, ExpressionError> {
        let mut parts = Vec::new();
        let mut rest = src;
        let mut segment_count = 0;
        while let Some(start) = rest.find("{{") {
            if start > 0 {
                parts.push(Part::Static(rest[..start].to_string()));
            }
            let after_open = &rest[start + 2..];
            let Some(end) = after_open.find("}}") else {
                return Err(ExpressionError::Syntax(
                    "unterminated `{{` in template".into(),
                ));
            };
            let expr_src = after_open[..end].trim();
            let expr = parser::parse(expr_src)?;
            parts.push(Part::Expr(expr));
            segment_count += 1;
            rest = &after_open[end + 2..];
        }
        if !rest.is_empty() {
            parts.push(Part::Static(rest.to_string()));
        }

        let single_expr = if segment_count == 1 && parts.len() == 1 {
            match parts.first() {
                Some(Part::Expr(e)) => Some(e.clone()),
                _ => None,
            }
        } else {
            None
        };

        Ok(Self { parts, single_expr })
    }

    /// Renders the template against `root`, always as a `String` — a lone
    /// `{{ expr }}` segment is stringified the same as one spliced into
    /// surrounding text.
    pub fn render(&self, root: &TemplateRoot<'_>) -> Result<Value, ExpressionError> {
        if let Some(expr) = &self.single_expr {
            return Ok(Value::String(stringify(&eval::eval(root, expr)?)));
        }
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Static(s) => out.push_str(s),
                Part::Expr(e) => out.push_str(&stringify(&eval::eval(root, e)?)),
            }
        }
        Ok(Value::String(out))
    }
}

fn stringify(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => v.to_string(),
        Value::Array(_) | Value::Object(_) => v.to_string(),
    }
}

/// Recursively renders every string leaf of `value` as a template. Non-string
/// leaves (and map keys) pass through unchanged.
pub fn render_value(root: &TemplateRoot<'_>, value: &Value) -> Result<Value, ExpressionError> {
    match value {
        Value::String(s) => Template::parse(s)?.render(root),
        Value::Array(items) => {
            let rendered: Result<Vec<Value>, ExpressionError> =
                items.iter().map(|v| render_value(root, v)).collect();
            Ok(Value::Array(rendered?))
        }
        Value::Object(map) => {
            let mut rendered = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                rendered.insert(k.clone(), render_value(root, v)?);
            }
            Ok(Value::Object(rendered))
        }
        other => Ok(other.clone()),
    }
}
