//! Dotted-path access over heterogeneous JSON.
//!
//! A single recursive accessor walks objects by string key and arrays by
//! numeric index. A missing segment — an absent key, an out-of-range index,
//! or indexing into a scalar — collapses to `Value::Null` rather than an
//! error; callers never need to distinguish "absent" from "null".

use serde_json::Value;

/// Resolves a dotted path like `vars.input.amount` or `nodes.if1.output.result`
/// against `root`. A leading `$.` or `$` is stripped before walking (an
/// alternate root-anchor spelling accepted alongside the bare form). An
/// empty path returns `root` itself, not `null`.
#[must_use]
pub fn resolve_path(root: &Value, path: &str) -> Value {
    let path = path.strip_prefix('$').unwrap_or(path);
    let path = path.strip_prefix('.').unwrap_or(path);

    if path.is_empty() {
        return root.clone();
    }

    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => match map.get(segment) {
                Some(v) => v,
                None => return Value::Null,
            },
            Value::Array(items) => match segment.parse::<usize>() {
                Ok(idx) => match items.get(idx) {
                    Some(v) => v,
                    None => return Value::Null,
                },
                Err(_) => return Value::Null,
            },
            _ => return Value::Null,
        };
    }
    current.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_nested_object_path() {
        let root = json!({"vars": {"input": {"amount": 80}}});
        assert_eq!(resolve_path(&root, "vars.input.amount"), json!(80));
    }

    #[test]
    fn resolves_array_index() {
        let root = json!({"items": ["a", "b", "c"]});
        assert_eq!(resolve_path(&root, "items.1"), json!("b"));
    }

    #[test]
    fn missing_segment_is_null_not_error() {
        let root = json!({"vars": {}});
        assert_eq!(resolve_path(&root, "vars.missing.deeper"), Value::Null);
    }

    #[test]
    fn out_of_range_index_is_null() {
        let root = json!({"items": ["a"]});
        assert_eq!(resolve_path(&root, "items.5"), Value::Null);
    }

    #[test]
    fn indexing_into_scalar_is_null() {
        let root = json!({"x": 1});
        assert_eq!(resolve_path(&root, "x.y"), Value::Null);
    }

    #[test]
    fn empty_path_returns_whole_root() {
        let root = json!({"a": 1});
        assert_eq!(resolve_path(&root, ""), root);
    }

    #[test]
    fn dollar_prefixed_path_is_accepted() {
        let root = json!({"a": {"b": 2}});
        assert_eq!(resolve_path(&root, "$.a.b"), json!(2));
    }
}
