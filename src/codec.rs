//! Conversion between form input text, typed payload values and raw JSON text.

use serde_json::{Map, Number, Value};

use crate::types::{FieldType, OperationMetadata};

/// Text shown in an input control for `value`. `None` and `null` are empty.
pub fn to_input_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| to_input_value(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        // objects and remaining scalars render as compact JSON
        Some(other) => other.to_string(),
    }
}

/// Cast input text to a typed value for the given field schema.
///
/// Numeric fields: empty text is `None` (the field is cleared) and text that
/// does not parse is kept as a string. Boolean fields are `true` only for the
/// literal `"true"`. Everything else passes through as a string.
pub fn cast_input_value(text: &str, field_schema: Option<&Value>) -> Option<Value> {
    match field_schema.and_then(FieldType::of_schema) {
        Some(t) if t.is_numeric() => {
            if text.is_empty() {
                return None;
            }
            Some(parse_number(text).unwrap_or_else(|| Value::String(text.to_string())))
        }
        Some(FieldType::Boolean) => Some(Value::Bool(text == "true")),
        _ => Some(Value::String(text.to_string())),
    }
}

/// Lenient numeric parse. Integral values stay integers so `"3"` becomes `3`
/// rather than `3.0`; whitespace-only input counts as zero.
fn parse_number(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(Value::from(0));
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Value::from(int));
    }
    let float = trimmed.parse::<f64>().ok()?;
    if float.fract() == 0.0 && float.abs() < i64::MAX as f64 {
        return Some(Value::from(float as i64));
    }
    Number::from_f64(float).map(Value::Number)
}

/// Serialize a raw-editor document with 2-space indentation.
pub fn stringify_raw(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Message document: metadata followed by the message content.
///
/// Absent content leaves the `message` key out entirely.
pub fn raw_document(metadata: &OperationMetadata, message: Option<Value>) -> Value {
    let mut doc = Map::new();
    metadata.stamp(&mut doc);
    if let Some(message) = message {
        doc.insert("message".into(), message);
    }
    Value::Object(doc)
}

/// Rewrite the metadata keys of raw text, keeping every other key.
///
/// Text that is not a JSON object is replaced by the metadata alone.
pub fn ensure_raw_metadata(raw: &str, metadata: &OperationMetadata) -> String {
    let mut doc = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    metadata.stamp(&mut doc);
    stringify_raw(&Value::Object(doc))
}
