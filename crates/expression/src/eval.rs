//! Walks a parsed [`Expr`] tree against a [`TemplateRoot`], re-checking the
//! node budget defensively (the parser already enforces it while building
//! the tree; this guards any `Expr` built by a caller directly).

use serde_json::Value;

use crate::builtins;
use crate::context::TemplateRoot;
use crate::core::MAX_EXPRESSION_NODES;
use crate::core::ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
use crate::error::ExpressionError;

/// Parses and evaluates `src` against `root` in one call.
pub fn eval_str(root: &TemplateRoot<'_>, src: &str) -> Result<Value, ExpressionError> {
    let expr = crate::core::parser::parse(src)?;
    eval(root, &expr)
}

/// Evaluates an already-parsed expression tree.
pub fn eval(root: &TemplateRoot<'_>, expr: &Expr) -> Result<Value, ExpressionError> {
    let mut budget = MAX_EXPRESSION_NODES;
    eval_inner(root, expr, &mut budget)
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    v.as_f64()
}

fn eval_inner(root: &TemplateRoot<'_>, expr: &Expr, budget: &mut usize) -> Result<Value, ExpressionError> {
    if *budget == 0 {
        return Err(ExpressionError::TooComplex {
            limit: MAX_EXPRESSION_NODES,
        });
    }
    *budget -= 1;

    match expr {
        Expr::Null => Ok(Value::Null),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Number(n) => Ok(Value::from(*n)),
        Expr::Str(s) => Ok(Value::String(s.clone())),
        Expr::Path(p) => Ok(root.resolve(p)),
        Expr::Unary(op, inner) => {
            let v = eval_inner(root, inner, budget)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!truthy(&v))),
                UnaryOp::Neg => {
                    let n = as_f64(&v).ok_or(ExpressionError::TypeMismatch {
                        function: "-",
                        type_name: "non-numeric",
                    })?;
                    Ok(Value::from(-n))
                }
            }
        }
        Expr::Logical(op, lhs, rhs) => {
            let l = eval_inner(root, lhs, budget)?;
            match op {
                LogicalOp::And => {
                    if !truthy(&l) {
                        Ok(l)
                    } else {
                        eval_inner(root, rhs, budget)
                    }
                }
                LogicalOp::Or => {
                    if truthy(&l) {
                        Ok(l)
                    } else {
                        eval_inner(root, rhs, budget)
                    }
                }
            }
        }
        Expr::Binary(op, lhs, rhs) => {
            let l = eval_inner(root, lhs, budget)?;
            let r = eval_inner(root, rhs, budget)?;
            eval_binary(*op, &l, &r)
        }
        Expr::Index(base, index) => {
            let base = eval_inner(root, base, budget)?;
            let index = eval_inner(root, index, budget)?;
            Ok(eval_index(&base, &index))
        }
        Expr::Call(name, arg_exprs) => {
            let mut args = Vec::with_capacity(arg_exprs.len());
            for a in arg_exprs {
                args.push(eval_inner(root, a, budget)?);
            }
            builtins::call(name, args)
        }
    }
}

fn eval_index(base: &Value, index: &Value) -> Value {
    match (base, index) {
        (Value::Array(items), Value::Number(n)) => {
            let idx = n.as_f64().unwrap_or(-1.0);
            if idx < 0.0 {
                return Value::Null;
            }
            items.get(idx as usize).cloned().unwrap_or(Value::Null)
        }
        (Value::Object(map), Value::String(key)) => map.get(key).cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn eval_binary(op: BinaryOp, l: &Value, r: &Value) -> Result<Value, ExpressionError> {
    use BinaryOp::{Add, Div, Eq, Ge, Gt, Le, Lt, Mul, Ne, Rem, Sub};

    if matches!(op, Eq | Ne) {
        return Ok(Value::Bool(if op == Eq { l == r } else { l != r }));
    }

    if let (Value::String(a), Value::String(b)) = (l, r) {
        return match op {
            Add => Ok(Value::String(format!("{a}{b}"))),
            Gt => Ok(Value::Bool(a > b)),
            Lt => Ok(Value::Bool(a < b)),
            Ge => Ok(Value::Bool(a >= b)),
            Le => Ok(Value::Bool(a <= b)),
            _ => Err(ExpressionError::TypeMismatch {
                function: "arithmetic",
                type_name: "string",
            }),
        };
    }

    let (a, b) = (
        as_f64(l).ok_or(ExpressionError::TypeMismatch {
            function: "arithmetic",
            type_name: "non-numeric",
        })?,
        as_f64(r).ok_or(ExpressionError::TypeMismatch {
            function: "arithmetic",
            type_name: "non-numeric",
        })?,
    );
    match op {
        Add => Ok(Value::from(a + b)),
        Sub => Ok(Value::from(a - b)),
        Mul => Ok(Value::from(a * b)),
        Div => {
            if b == 0.0 {
                Err(ExpressionError::DivisionByZero)
            } else {
                Ok(Value::from(a / b))
            }
        }
        Rem => {
            if b == 0.0 {
                Err(ExpressionError::DivisionByZero)
            } else {
                Ok(Value::from(a % b))
            }
        }
        Gt => Ok(Value::Bool(a > b)),
        Lt => Ok(Value::Bool(a < b)),
        Ge => Ok(Value::Bool(a >= b)),
        Le => Ok(Value::Bool(a <= b)),
        Eq | Ne => unreachable!("handled above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn empty_root() -> (Map<String, Value>, Map<String, Value>, Map<String, Value>) {
        (Map::new(), Map::new(), Map::new())
    }

    #[test]
    fn arithmetic_and_comparison() {
        let (vars, nodes, system) = empty_root();
        let input = Value::Null;
        let last_response = Value::Null;
        let root = TemplateRoot::new(&vars, &nodes, &system, &input, &last_response);
        assert_eq!(eval_str(&root, "1 + 2 * 3").unwrap(), Value::from(7.0));
        assert_eq!(eval_str(&root, "(1 + 2) * 3").unwrap(), Value::from(9.0));
        assert_eq!(eval_str(&root, "1 < 2 and 2 < 3").unwrap(), Value::Bool(true));
    }

    #[test]
    fn path_resolution_inside_expression() {
        let mut vars = Map::new();
        vars.insert("amount".into(), Value::from(42));
        let (_, nodes, system) = empty_root();
        let input = Value::Null;
        let last_response = Value::Null;
        let root = TemplateRoot::new(&vars, &nodes, &system, &input, &last_response);
        assert_eq!(
            eval_str(&root, "vars.amount >= 42").unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn builtin_call_inside_expression() {
        let (vars, nodes, system) = empty_root();
        let input = Value::from(vec![1, 2, 3]);
        let last_response = Value::Null;
        let root = TemplateRoot::new(&vars, &nodes, &system, &input, &last_response);
        assert_eq!(eval_str(&root, "len(input) == 3").unwrap(), Value::Bool(true));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let (vars, nodes, system) = empty_root();
        let input = Value::Null;
        let last_response = Value::Null;
        let root = TemplateRoot::new(&vars, &nodes, &system, &input, &last_response);
        assert!(matches!(
            eval_str(&root, "1 / 0"),
            Err(ExpressionError::DivisionByZero)
        ));
    }

    #[test]
    fn too_complex_expression_is_rejected() {
        let (vars, nodes, system) = empty_root();
        let input = Value::Null;
        let last_response = Value::Null;
        let root = TemplateRoot::new(&vars, &nodes, &system, &input, &last_response);
        let deeply_nested = "1".to_string() + &" + 1".repeat(300);
        assert!(matches!(
            eval_str(&root, &deeply_nested),
            Err(ExpressionError::TooComplex { .. })
        ));
    }
}
