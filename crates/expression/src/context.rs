//! [`TemplateRoot`]: the read-only view expressions and templates resolve
//! dotted paths against. Lives here, not in `nebula-execution`, so this
//! crate has no dependency on the execution crate — `nebula-engine`
//! constructs one from its `ExecutionContext` at each evaluation site.

use serde_json::{Map, Value};

/// A borrowed snapshot of `{vars, nodes, system}` plus the two convenience
/// shortcuts (`input`, `last_response`) the original exposes at the top
/// level during node evaluation.
#[derive(Debug, Clone, Copy)]
pub struct TemplateRoot<'a> {
    pub vars: &'a Map<String, Value>,
    pub nodes: &'a Map<String, Value>,
    pub system: &'a Map<String, Value>,
    pub input: &'a Value,
    pub last_response: &'a Value,
}

impl<'a> TemplateRoot<'a> {
    #[must_use]
    pub fn new(
        vars: &'a Map<String, Value>,
        nodes: &'a Map<String, Value>,
        system: &'a Map<String, Value>,
        input: &'a Value,
        last_response: &'a Value,
    ) -> Self {
        Self {
            vars,
            nodes,
            system,
            input,
            last_response,
        }
    }

    /// The extended root used whenever a path carries a recognized prefix:
    /// `vars`, `nodes`, `system`, `input`, `last_response` all live at the
    /// top level.
    fn extended(&self) -> Value {
        let mut map = Map::new();
        map.insert("vars".into(), Value::Object(self.vars.clone()));
        map.insert("nodes".into(), Value::Object(self.nodes.clone()));
        map.insert("system".into(), Value::Object(self.system.clone()));
        map.insert("input".into(), self.input.clone());
        map.insert("last_response".into(), self.last_response.clone());
        Value::Object(map)
    }

    /// The bare root: only `{vars, nodes, system}`, no `input`/`last_response`
    /// shortcuts. Used when a selector carries no recognized prefix at all.
    fn bare(&self) -> Value {
        let mut map = Map::new();
        map.insert("vars".into(), Value::Object(self.vars.clone()));
        map.insert("nodes".into(), Value::Object(self.nodes.clone()));
        map.insert("system".into(), Value::Object(self.system.clone()));
        Value::Object(map)
    }

    /// Resolves a dotted path per the exact rule used by `define_variable`
    /// and `save` selector resolution (and by bare `Path` nodes inside a
    /// larger expression): a `$.`-prefixed or `vars./nodes./system./input./
    /// last_response.`-prefixed path walks the extended root; anything else
    /// walks the bare `{vars, nodes, system}` root.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Value {
        const ROOT_NAMES: [&str; 5] = ["vars", "nodes", "system", "input", "last_response"];
        if let Some(rest) = path.strip_prefix("$.") {
            return resolve_path(&self.extended(), rest);
        }
        let first_segment = path.split('.').next().unwrap_or(path);
        if ROOT_NAMES.contains(&first_segment) {
            return resolve_path(&self.extended(), path);
        }
        resolve_path(&self.bare(), path)
    }
}

/// Walks `.`-delimited segments of `path` against `root`. Object segments
/// index by string key; purely numeric segments index arrays (out-of-range
/// yields `null`). An empty path returns `root` itself. Any unresolvable
/// segment short-circuits to `Value::Null`.
#[must_use]
pub fn resolve_path(root: &Value, path: &str) -> Value {
    if path.is_empty() {
        return root.clone();
    }
    let mut current = root;
    for segment in path.split('.') {
        match current {
            Value::Object(map) => match map.get(segment) {
                Some(v) => current = v,
                None => return Value::Null,
            },
            Value::Array(items) => match segment.parse::<usize>() {
                Ok(idx) => match items.get(idx) {
                    Some(v) => current = v,
                    None => return Value::Null,
                },
                Err(_) => return Value::Null,
            },
            _ => return Value::Null,
        }
    }
    current.clone()
}

/// A config string is an *expression* (full evaluator) if it contains any
/// comparison operator or the space-padded boolean keywords/parentheses;
/// otherwise it is a bare path lookup. Exact heuristic from the original
/// implementation, used by `define_variable.selector` and `save.from`
/// before either falls back to `defaultValue`/`last_response`.
#[must_use]
pub fn looks_like_expression(s: &str) -> bool {
    const MARKERS: [&str; 9] = ["==", "!=", ">=", "<=", " and ", " or ", " not ", "(", ")"];
    MARKERS.iter().any(|m| s.contains(m))
}
