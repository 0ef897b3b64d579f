//! Utility functions for the templating system.

use serde_json::Value;

/// Canonical text form of a context value when substituted into a template.
///
/// | Value | Output |
/// |-------|--------|
/// | string | the string itself, unquoted |
/// | integer | digits only, e.g. `42`, `-7` |
/// | float | shortest round-trip form, e.g. `1.5`, `2.0`, `1e20` |
/// | boolean | `true` / `false` |
/// | null | `null` |
/// | sequence / mapping | compact JSON, e.g. `["x","y"]`, `{"a":1}` |
///
/// # Examples
///
/// ```rust
/// use agentrx::templating::value_to_string;
/// use serde_json::json;
///
/// assert_eq!(value_to_string(&json!("hi")), "hi");
/// assert_eq!(value_to_string(&json!(42)), "42");
/// assert_eq!(value_to_string(&json!(2.0)), "2.0");
/// assert_eq!(value_to_string(&json!(true)), "true");
/// assert_eq!(value_to_string(&json!(["x", "y"])), r#"["x","y"]"#);
/// ```
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Short name of a value's kind, used in error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
