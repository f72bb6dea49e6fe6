//! Payload schema preparation and classification.
//!
//! Operation payload schemas arrive straight from a parsed API document and
//! carry documentation-only keys and boolean shorthands. Before a form can be
//! derived from them they are normalized (blocked keys dropped) and then
//! sanitized (boolean `true` schemas rewritten to `{}`).

use serde_json::{Map, Value};

use crate::types::{
    AdditionalField, FieldType, PayloadShape, BLOCKED_SCHEMA_KEYS, BOOLEAN_SCHEMA_KEYS,
    PRIMITIVE_PAYLOAD_FIELD,
};

/// Strip documentation-only keys from a schema, recursively.
///
/// A bare `true` schema becomes `{}`, as do `true` entries in schema
/// positions (`properties` values and `items`). Other scalars pass through.
pub fn normalize(schema: &Value) -> Value {
    normalize_node(schema)
}

/// Rewrite boolean `true` schemas into empty object schemas, recursively.
///
/// Must run after [`normalize`], which can expose nested boolean values.
pub fn sanitize(schema: &Value) -> Value {
    match schema {
        Value::Bool(true) => Value::Object(Map::new()),
        Value::Array(arr) => Value::Array(arr.iter().map(sanitize).collect()),
        Value::Object(map) => {
            let mut clean = Map::new();
            for (key, value) in map {
                let cleaned = if BOOLEAN_SCHEMA_KEYS.contains(&key.as_str())
                    && value == &Value::Bool(true)
                {
                    Value::Object(Map::new())
                } else {
                    sanitize(value)
                };
                clean.insert(key.clone(), cleaned);
            }
            Value::Object(clean)
        }
        other => other.clone(),
    }
}

/// Normalize then sanitize. `None` stays `None`.
pub fn prepare_schema(schema: Option<&Value>) -> Option<Value> {
    schema.map(|s| sanitize(&normalize(s)))
}

// --- Normalization internals ---

fn normalize_node(schema: &Value) -> Value {
    match schema {
        Value::Bool(true) => Value::Object(Map::new()),
        other => normalize_value(other),
    }
}

fn normalize_value(value: &Value) -> Value {
    match value {
        Value::Array(arr) => Value::Array(arr.iter().map(normalize_value).collect()),
        Value::Object(map) => {
            let mut clean = Map::new();
            for (key, child) in map {
                if BLOCKED_SCHEMA_KEYS.contains(&key.as_str()) {
                    continue;
                }
                let normalized = match key.as_str() {
                    "properties" => match child {
                        Value::Object(props) => Value::Object(
                            props
                                .iter()
                                .filter(|(name, _)| !BLOCKED_SCHEMA_KEYS.contains(&name.as_str()))
                                .map(|(name, prop)| (name.clone(), normalize_node(prop)))
                                .collect(),
                        ),
                        other => normalize_value(other),
                    },
                    "items" => normalize_node(child),
                    _ => normalize_value(child),
                };
                clean.insert(key.clone(), normalized);
            }
            Value::Object(clean)
        }
        other => other.clone(),
    }
}

// --- Classification ---

fn schema_type(schema: &Value) -> Option<&str> {
    schema.get("type").and_then(Value::as_str)
}

/// True for scalar-typed schemas that declare no `properties` object.
///
/// An empty `properties` object still disqualifies the schema.
pub fn is_primitive_schema(schema: &Value) -> bool {
    match FieldType::of_schema(schema) {
        Some(_) => !schema.get("properties").map_or(false, Value::is_object),
        None => false,
    }
}

/// True for schemas with `"type": "array"`.
pub fn is_array_schema(schema: &Value) -> bool {
    schema_type(schema) == Some("array")
}

/// Classify a prepared payload schema. A missing schema is object-shaped.
pub fn classify(schema: Option<&Value>) -> PayloadShape {
    let Some(schema) = schema else {
        return PayloadShape::Object;
    };
    if is_primitive_schema(schema) {
        // is_primitive_schema guarantees a scalar type keyword
        return FieldType::of_schema(schema)
            .map(PayloadShape::Primitive)
            .unwrap_or(PayloadShape::Object);
    }
    if is_array_schema(schema) {
        return PayloadShape::Array;
    }
    if schema_type(schema) == Some("null") {
        return PayloadShape::Null;
    }
    PayloadShape::Object
}

/// Ordered field name to field schema mapping that drives the form.
///
/// Non-empty `properties` are returned verbatim; scalar-typed schemas get a
/// single synthetic `message` field; anything else yields an empty mapping.
pub fn extract_schema_properties(schema: Option<&Value>) -> Map<String, Value> {
    let Some(schema) = schema else {
        return Map::new();
    };

    if let Some(Value::Object(props)) = schema.get("properties") {
        if !props.is_empty() {
            return props.clone();
        }
    }

    if let Some(field_type) = FieldType::of_schema(schema) {
        let mut synthetic = Map::new();
        synthetic.insert(
            PRIMITIVE_PAYLOAD_FIELD.to_string(),
            serde_json::json!({ "type": field_type.as_str() }),
        );
        return synthetic;
    }

    Map::new()
}

/// Extracted properties with host-declared fields merged in.
///
/// Additional fields override schema-derived entries of the same name.
pub fn payload_properties(
    schema: Option<&Value>,
    additional_fields: &[AdditionalField],
) -> Map<String, Value> {
    let mut merged = extract_schema_properties(schema);
    for field in additional_fields {
        merged.insert(field.key.clone(), field.to_schema());
    }
    merged
}

/// Item schema of an array payload, if any.
pub fn array_item_schema(schema: Option<&Value>) -> Option<&Value> {
    schema
        .filter(|s| is_array_schema(s))
        .and_then(|s| s.get("items"))
}

/// Zero value for a new array item, from the `items` schema type.
pub fn default_item_value(item_schema: Option<&Value>) -> Value {
    item_schema
        .and_then(FieldType::of_schema)
        .unwrap_or(FieldType::String)
        .zero_value()
}

/// Zero-value payload for a prepared schema.
///
/// Object-like schemas produce a map of the additional fields' defaults.
pub fn build_default_payload(schema: Option<&Value>, additional_fields: &[AdditionalField]) -> Value {
    match classify(schema) {
        PayloadShape::Null => Value::Null,
        PayloadShape::Array => Value::Array(Vec::new()),
        PayloadShape::Primitive(field_type) => field_type.zero_value(),
        PayloadShape::Object => Value::Object(
            additional_fields
                .iter()
                .map(|f| (f.key.clone(), f.initial_value()))
                .collect(),
        ),
    }
}
