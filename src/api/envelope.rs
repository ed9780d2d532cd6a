//! Response envelope decoding.
//!
//! The server answers reads either with a bare document (`[...]` or `{...}`)
//! or with a wrapper `{ "data": [...] }`. [`unwrap_envelope`] is the single
//! place that decides which shape was sent.

use serde_json::Value;

/// Unwrap a response body into the document the caller stored.
///
/// - `{ "data": [...] }` yields the inner array.
/// - Any other object, array or scalar is returned unchanged.
/// - An absent or empty body (`None`, `null`, `false`, `0`, `""`) yields `[]`.
///
/// An object whose `data` field is not an array is not an envelope.
pub fn unwrap_envelope(body: Option<Value>) -> Value {
    match body {
        Some(Value::Object(mut map)) => match map.remove("data") {
            Some(Value::Array(items)) => Value::Array(items),
            Some(other) => {
                map.insert("data".to_string(), other);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        Some(value) if !is_empty_body(&value) => value,
        _ => Value::Array(Vec::new()),
    }
}

/// Decode raw response text and unwrap it. Blank text counts as an absent body.
pub fn decode_envelope(text: &str) -> serde_json::Result<Value> {
    if text.trim().is_empty() {
        return Ok(unwrap_envelope(None));
    }
    serde_json::from_str(text).map(|value| unwrap_envelope(Some(value)))
}

fn is_empty_body(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
