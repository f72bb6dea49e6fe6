//! Core types shared by the schema pipeline and the editor.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Form-field key used for scalar payload schemas (e.g. `{"type":"string"}`).
pub const PRIMITIVE_PAYLOAD_FIELD: &str = "message";

/// Metadata keys injected into every outgoing message.
pub const OPERATION_ID_KEY: &str = "operation_id";
pub const OPERATION_TYPE_KEY: &str = "operation_type";

/// Operation id used when the handle exposes none.
pub const DEFAULT_OPERATION_ID: &str = "operation";

/// Slot defaults when the host context omits them.
pub const DEFAULT_CHANNEL_NAME: &str = "unknown";
pub const DEFAULT_SLOT_TYPE: &str = "send";

/// Schema keys that only document a schema and are dropped before building forms.
pub const BLOCKED_SCHEMA_KEYS: &[&str] = &[
    "x-parser-schema-id",
    "anySchema",
    "cannotBeDefined",
    "maximum",
    "minimum",
    "oneOf",
    "readOnly",
    "writeOnly",
    "description",
];

/// Keys whose boolean `true` value is rewritten to an empty schema.
pub const BOOLEAN_SCHEMA_KEYS: &[&str] = &[
    "additionalProperties",
    "dependencies",
    "patternProperties",
    "definitions",
];

/// Scalar field types a form control can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
}

impl FieldType {
    /// Parse a schema `type` keyword. Returns `None` for non-scalar types.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(FieldType::String),
            "number" => Some(FieldType::Number),
            "integer" => Some(FieldType::Integer),
            "boolean" => Some(FieldType::Boolean),
            _ => None,
        }
    }

    /// Reads the `type` keyword of a schema node, if it names a scalar type.
    pub fn of_schema(schema: &Value) -> Option<Self> {
        schema.get("type").and_then(Value::as_str).and_then(Self::parse)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Number | FieldType::Integer)
    }

    /// The value a fresh control of this type starts with.
    pub fn zero_value(&self) -> Value {
        match self {
            FieldType::Number | FieldType::Integer => Value::from(0),
            FieldType::Boolean => Value::Bool(false),
            FieldType::String => Value::String(String::new()),
        }
    }
}

/// Host-declared form field that is not part of the payload schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalField {
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl AdditionalField {
    pub fn new(key: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            field_type,
            label: None,
            default_value: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Schema node merged into the extracted form properties.
    pub fn to_schema(&self) -> Value {
        let mut node = Map::new();
        node.insert("type".into(), Value::from(self.field_type.as_str()));
        node.insert(
            "title".into(),
            Value::from(self.label.clone().unwrap_or_else(|| self.key.clone())),
        );
        Value::Object(node)
    }

    /// Declared default, or the type's zero value.
    pub fn initial_value(&self) -> Value {
        self.default_value
            .clone()
            .unwrap_or_else(|| self.field_type.zero_value())
    }
}

/// Identity of the operation stamped on every outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationMetadata {
    pub operation_id: String,
    pub operation_type: String,
}

impl OperationMetadata {
    /// Writes both metadata keys into `target`, replacing existing values.
    pub fn stamp(&self, target: &mut Map<String, Value>) {
        target.insert(OPERATION_ID_KEY.into(), Value::from(self.operation_id.clone()));
        target.insert(
            OPERATION_TYPE_KEY.into(),
            Value::from(self.operation_type.clone()),
        );
    }
}

/// Which edit surface is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    #[default]
    Form,
    Raw,
}

/// Payload shape after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadShape {
    /// Scalar payload edited through the synthetic `message` field.
    Primitive(FieldType),
    /// Ordered list edited item by item.
    Array,
    /// Explicit `"type": "null"` payload.
    Null,
    /// Anything else, edited as a field map.
    Object,
}
