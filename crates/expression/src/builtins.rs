//! The fixed builtin-function table: `len, min, max, sum, any, all, abs,
//! int, float, str, bool`. No other names resolve — an unknown call is a
//! hard evaluation error, not a typo-tolerant fallback.

use serde_json::Value;

use crate::error::ExpressionError;

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

fn as_f64(function: &'static str, v: &Value) -> Result<f64, ExpressionError> {
    match v {
        Value::Number(n) => Ok(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| ExpressionError::TypeMismatch {
            function,
            type_name: "string",
        }),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => Err(ExpressionError::TypeMismatch {
            function,
            type_name: type_name_of(other),
        }),
    }
}

fn type_name_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Flattens the call arguments into the sequence a reducer (`min`, `max`,
/// `sum`) should walk: a single array argument is unwrapped in place,
/// otherwise every argument is treated as one element.
fn numeric_sequence(function: &'static str, args: &[Value]) -> Result<Vec<f64>, ExpressionError> {
    let items: Vec<&Value> = match args {
        [Value::Array(items)] => items.iter().collect(),
        other => other.iter().collect(),
    };
    items.into_iter().map(|v| as_f64(function, v)).collect()
}

pub fn call(name: &str, args: Vec<Value>) -> Result<Value, ExpressionError> {
    match name {
        "len" => {
            let [v] = one_arg("len", args)?;
            let n = match v {
                Value::String(s) => s.chars().count(),
                Value::Array(a) => a.len(),
                Value::Object(o) => o.len(),
                other => {
                    return Err(ExpressionError::TypeMismatch {
                        function: "len",
                        type_name: type_name_of(&other),
                    });
                }
            };
            Ok(Value::from(n as u64))
        }
        "min" => {
            let nums = numeric_sequence("min", &args)?;
            nums.into_iter()
                .fold(None, |acc, n| Some(acc.map_or(n, |a: f64| a.min(n))))
                .map(Value::from)
                .ok_or(ExpressionError::ArityMismatch {
                    function: "min".into(),
                    expected: "at least 1",
                    got: 0,
                })
        }
        "max" => {
            let nums = numeric_sequence("max", &args)?;
            nums.into_iter()
                .fold(None, |acc, n| Some(acc.map_or(n, |a: f64| a.max(n))))
                .map(Value::from)
                .ok_or(ExpressionError::ArityMismatch {
                    function: "max".into(),
                    expected: "at least 1",
                    got: 0,
                })
        }
        "sum" => {
            let nums = numeric_sequence("sum", &args)?;
            Ok(Value::from(nums.into_iter().sum::<f64>()))
        }
        "any" => {
            let [v] = one_arg("any", args)?;
            let Value::Array(items) = v else {
                return Err(ExpressionError::TypeMismatch {
                    function: "any",
                    type_name: type_name_of(&v),
                });
            };
            Ok(Value::Bool(items.iter().any(truthy)))
        }
        "all" => {
            let [v] = one_arg("all", args)?;
            let Value::Array(items) = v else {
                return Err(ExpressionError::TypeMismatch {
                    function: "all",
                    type_name: type_name_of(&v),
                });
            };
            Ok(Value::Bool(items.iter().all(truthy)))
        }
        "abs" => {
            let [v] = one_arg("abs", args)?;
            Ok(Value::from(as_f64("abs", &v)?.abs()))
        }
        "int" => {
            let [v] = one_arg("int", args)?;
            Ok(Value::from(as_f64("int", &v)?.trunc() as i64))
        }
        "float" => {
            let [v] = one_arg("float", args)?;
            Ok(Value::from(as_f64("float", &v)?))
        }
        "str" => {
            let [v] = one_arg("str", args)?;
            let s = match v {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            Ok(Value::String(s))
        }
        "bool" => {
            let [v] = one_arg("bool", args)?;
            Ok(Value::Bool(truthy(&v)))
        }
        other => Err(ExpressionError::NoSuchFunction(other.to_string())),
    }
}

fn one_arg(function: &'static str, mut args: Vec<Value>) -> Result<[Value; 1], ExpressionError> {
    if args.len() != 1 {
        return Err(ExpressionError::ArityMismatch {
            function: function.to_string(),
            expected: "1",
            got: args.len(),
        });
    }
    Ok([args.pop().expect("len checked above")])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_counts_chars_items_and_keys() {
        assert_eq!(call("len", vec![Value::from("abc")]).unwrap(), Value::from(3u64));
        assert_eq!(
            call("len", vec![Value::from(vec![1, 2])]).unwrap(),
            Value::from(2u64)
        );
    }

    #[test]
    fn min_max_accept_array_or_variadic() {
        assert_eq!(call("min", vec![Value::from(vec![3, 1, 2])]).unwrap(), Value::from(1.0));
        assert_eq!(
            call("max", vec![Value::from(3), Value::from(1), Value::from(2)]).unwrap(),
            Value::from(3.0)
        );
    }

    #[test]
    fn sum_adds_array_elements() {
        assert_eq!(call("sum", vec![Value::from(vec![1, 2, 3])]).unwrap(), Value::from(6.0));
    }

    #[test]
    fn any_all_short_circuit_on_truthiness() {
        assert_eq!(
            call("any", vec![Value::from(vec![false, false, true])]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            call("all", vec![Value::from(vec![true, false])]).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn unknown_function_is_rejected() {
        assert!(matches!(
            call("eval", vec![]),
            Err(ExpressionError::NoSuchFunction(_))
        ));
    }
}
