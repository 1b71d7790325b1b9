//! Synchronous execution of a single script call inside an embedded,
//! network- and filesystem-free QuickJS VM (§4.10).
//!
//! A fresh [`rquickjs::Runtime`]/[`rquickjs::Context`] pair is built for
//! every call; nothing persists across calls, and nothing but the
//! standard global object plus a small `__nebula` helper namespace is
//! ever installed. There is no module loader, so `import`/`require` have
//! no binding to resolve against.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rquickjs::{CatchResultExt, Context, Function, Object, Runtime};
use serde_json::Value;

use crate::error::SandboxError;

/// The default entry-point function name scripted nodes are expected to
/// declare (`python_request`/`start_python`, §4.6).
pub const DEFAULT_FUNCTION: &str = "run";

/// Runs `source`, then calls `function_name` with `context` as its sole
/// argument, returning its JSON-serialized result.
///
/// This function blocks the calling thread for up to `timeout`; callers
/// running inside a `tokio` runtime must invoke it via
/// [`tokio::task::spawn_blocking`] rather than calling it directly from
/// an async context.
pub fn run(
    source: &str,
    function_name: &str,
    context: &Value,
    timeout: Duration,
) -> Result<Value, SandboxError> {
    let runtime = Runtime::new().map_err(|err| SandboxError::Runtime(err.to_string()))?;
    let deadline = Instant::now() + timeout;
    runtime.set_interrupt_handler(Some(Box::new(move || Instant::now() >= deadline)));

    let js_context =
        Context::full(&runtime).map_err(|err| SandboxError::Runtime(err.to_string()))?;

    js_context.with(|ctx| -> Result<Value, SandboxError> {
        install_host_helpers(&ctx)?;

        ctx.eval::<(), _>(source)
            .catch(&ctx)
            .map_err(|caught| SandboxError::Compile(caught.to_string()))?;

        let globals = ctx.globals();
        let func: Function = globals
            .get(function_name)
            .map_err(|_| SandboxError::NoSuchFunction(function_name.to_string()))?;

        let context_json = serde_json::to_string(context)?;
        let arg: rquickjs::Value = ctx
            .json_parse(context_json)
            .catch(&ctx)
            .map_err(|caught| SandboxError::Runtime(caught.to_string()))?;

        let result: rquickjs::Value = func
            .call((arg,))
            .catch(&ctx)
            .map_err(|caught| SandboxError::Thrown(caught.to_string()))?;

        if result.is_undefined() {
            return Ok(Value::Null);
        }

        let rendered: String = ctx
            .json_stringify(result)
            .catch(&ctx)
            .map_err(|caught| SandboxError::Runtime(caught.to_string()))?
            .map(|s| s.to_string())
            .transpose()
            .map_err(|err| SandboxError::Runtime(err.to_string()))?
            .unwrap_or_else(|| "null".to_string());

        serde_json::from_str(&rendered).map_err(SandboxError::from)
    })
}

/// Installs the `__nebula` whitelist object (§4.10: "a time source" — the
/// rest of the host helper list, arithmetic/JSON/collections, is already
/// covered by QuickJS's own `Math`/`JSON`/`Array`/`Object` globals).
fn install_host_helpers(ctx: &rquickjs::Ctx<'_>) -> Result<(), SandboxError> {
    let nebula = Object::new(ctx.clone()).map_err(|err| SandboxError::Runtime(err.to_string()))?;
    let now = Function::new(ctx.clone(), || -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0)
    })
    .map_err(|err| SandboxError::Runtime(err.to_string()))?;
    nebula
        .set("now", now)
        .map_err(|err| SandboxError::Runtime(err.to_string()))?;
    ctx.globals()
        .set("__nebula", nebula)
        .map_err(|err| SandboxError::Runtime(err.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn returns_plain_value() {
        let out = run(
            "function run(context) { return context.vars.x + 1; }",
            DEFAULT_FUNCTION,
            &json!({"vars": {"x": 41}}),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(out, json!(42));
    }

    #[test]
    fn merges_object_result() {
        let out = run(
            "function run(context) { return { vars: { greeting: 'hi ' + context.vars.name } }; }",
            DEFAULT_FUNCTION,
            &json!({"vars": {"name": "nebula"}}),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(out, json!({"vars": {"greeting": "hi nebula"}}));
    }

    #[test]
    fn missing_function_is_reported() {
        let err = run(
            "function other() {}",
            DEFAULT_FUNCTION,
            &json!({}),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, SandboxError::NoSuchFunction(_)));
    }

    #[test]
    fn thrown_exception_is_reported() {
        let err = run(
            "function run(context) { throw new Error('boom'); }",
            DEFAULT_FUNCTION,
            &json!({}),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, SandboxError::Thrown(_)));
    }

    #[test]
    fn no_network_or_fs_globals_exist() {
        let err = run(
            "function run() { return typeof fetch; }",
            DEFAULT_FUNCTION,
            &json!({}),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(err, json!("undefined"));
    }

    #[test]
    fn timeout_is_enforced() {
        let err = run(
            "function run() { while (true) {} }",
            DEFAULT_FUNCTION,
            &json!({}),
            Duration::from_millis(50),
        )
        .unwrap_err();
        assert!(matches!(err, SandboxError::Thrown(_) | SandboxError::Runtime(_)));
    }
}
