//! WASM bindings for the plume template engine.
//!
//! Exposes `render()`, `check()`, `filters()` and `version()` to JavaScript
//! via wasm-bindgen. Render failures throw with the rendered diagnostic as
//! the error message.

use plume_render::{Context, Engine, EngineConfig, Error};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Result of [`check`], returned to JS as a plain object.
#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub ok: bool,
    pub expressions: usize,
    pub error: Option<ErrorInfo>,
}

/// A syntax error, with byte offsets into the source.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub message: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
    pub report: String,
}

impl From<&Error> for ErrorInfo {
    fn from(error: &Error) -> Self {
        let diagnostic = error.diagnostic();
        Self {
            message: diagnostic.message.clone(),
            label: diagnostic.primary.text.clone(),
            start: diagnostic.primary.span.start,
            end: diagnostic.primary.span.end,
            report: error.to_string(),
        }
    }
}

/// Render a template.
///
/// `context` is a plain object of template variables; `config` is an
/// optional `{ autoescape, string_if_invalid }` object. Either may be
/// `undefined`. Throws a JS error with the diagnostic report on failure.
#[wasm_bindgen]
pub fn render(source: &str, context: JsValue, config: JsValue) -> Result<String, JsError> {
    let context: serde_json::Value = if context.is_undefined() || context.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        serde_wasm_bindgen::from_value(context).map_err(|e| JsError::new(&e.to_string()))?
    };
    let config: EngineConfig = if config.is_undefined() || config.is_null() {
        EngineConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(|e| JsError::new(&e.to_string()))?
    };

    render_json(source, context, config).map_err(|e| JsError::new(&e))
}

/// Check a template for syntax errors.
///
/// Returns `{ ok, expressions, error }` where `error` is `null` or
/// `{ message, label, start, end, report }`.
#[wasm_bindgen]
pub fn check(source: &str) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(&check_source(source)).map_err(|e| JsError::new(&e.to_string()))
}

/// Names of the builtin filters.
#[wasm_bindgen]
pub fn filters() -> js_sys::Array {
    Engine::new()
        .registry()
        .names()
        .into_iter()
        .map(JsValue::from)
        .collect()
}

/// Get the engine version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn render_json(
    source: &str,
    context: serde_json::Value,
    config: EngineConfig,
) -> Result<String, String> {
    let context = Context::from_json(context).map_err(|e| e.to_string())?;
    let engine = Engine::builder().config(config).build();
    let template = engine.compile(source).map_err(|e| e.to_string())?;
    template.render(&context).map_err(|e| e.to_string())
}

fn check_source(source: &str) -> CheckResult {
    match Engine::new().compile(source) {
        Ok(template) => CheckResult {
            ok: true,
            expressions: template.ast().expression_count(),
            error: None,
        },
        Err(error) => CheckResult {
            ok: false,
            expressions: 0,
            error: Some(ErrorInfo::from(&error)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    // =========================================================================
    // Native tests (non-WASM): the render and check pipeline
    // =========================================================================

    fn native_render(source: &str, context: serde_json::Value) -> Result<String, String> {
        render_json(source, context, EngineConfig::default())
    }

    #[test]
    fn test_empty_template() {
        assert_eq!(native_render("", json!({})), Ok(String::new()));
    }

    #[test]
    fn test_render_with_context() {
        let output = native_render("[{{ name|center:9 }}]", json!({"name": "plume"}));
        assert_eq!(output, Ok("[  plume  ]".to_string()));
    }

    #[test]
    fn test_render_with_config() {
        let config = EngineConfig {
            autoescape: false,
            string_if_invalid: "?".to_string(),
        };
        let output = render_json("{{ a }}{{ b }}", json!({"a": "<b>"}), config);
        assert_eq!(output, Ok("<b>?".to_string()));
    }

    #[test]
    fn test_render_error_is_report() {
        let err = native_render("{{ a|center:w }}", json!({"a": "x", "w": "wide"})).unwrap_err();
        assert!(err.starts_with("  × Couldn't convert argument wide to integer\n"));
        assert!(err.contains("╰── argument"));
    }

    #[test]
    fn test_context_must_be_object() {
        let err = native_render("{{ a }}", json!([1, 2])).unwrap_err();
        assert_eq!(err, "context must be a JSON object, got array");
    }

    #[test]
    fn test_check_ok() {
        let result = check_source("{{ a }} and {{ b|upper }}");
        assert!(result.ok);
        assert_eq!(result.expressions, 2);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_check_error() {
        let result = check_source("{{ a|center }}");
        assert!(!result.ok);
        let error = result.error.unwrap();
        assert_eq!(error.message, "center requires 2 arguments, 1 provided");
        assert_eq!(error.label, "here");
        assert_eq!((error.start, error.end), (5, 11));
        assert!(error.report.contains("{{ a|center }}"));
    }

    #[test]
    fn test_version() {
        let v = version();
        assert!(!v.is_empty());
        assert!(v.contains('.'));
    }

    #[test]
    fn test_multiple_renders() {
        // No state leaks between engines
        let out1 = native_render("{{ x }}", json!({"x": 1}));
        let out2 = native_render("{{ x }}", json!({"y": 1}));
        assert_eq!(out1, Ok("1".to_string()));
        assert_eq!(out2, Ok(String::new()));
    }
}
