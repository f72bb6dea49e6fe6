//! Read-only access to host operation handles.
//!
//! Hosts hand over operations whose accessors may or may not exist. Each
//! accessor is a trait method defaulting to `None`, so a handle implements
//! only what it actually exposes and callers never have to check what exists.

use serde_json::Value;

use crate::types::{OperationMetadata, DEFAULT_OPERATION_ID};

/// Identity fields reported by an operation's `meta()` accessor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationMeta {
    pub id: Option<String>,
    pub action: Option<String>,
}

/// An operation as exposed by the host document model.
pub trait OperationHandle {
    fn meta(&self) -> Option<OperationMeta> {
        None
    }

    fn id(&self) -> Option<String> {
        None
    }

    fn messages(&self) -> Option<Box<dyn MessageList + '_>> {
        None
    }

    /// Raw JSON view of the operation (`{"message": {"payload": ...}}`).
    fn json(&self) -> Option<Value> {
        None
    }
}

/// Ordered messages attached to an operation.
pub trait MessageList {
    fn all(&self) -> Option<Vec<Box<dyn Message + '_>>>;
}

pub trait Message {
    fn payload(&self) -> Option<Box<dyn PayloadHandle + '_>>;
}

pub trait PayloadHandle {
    fn json(&self) -> Option<Value>;
}

/// Locate the payload schema of an operation's first message.
///
/// Walks `messages().all()[0].payload().json()` first and falls back to
/// `json().message.payload`. Any missing link yields `None`.
pub fn resolve_payload_schema(operation: &dyn OperationHandle) -> Option<Value> {
    if let Some(schema) = first_message_payload(operation) {
        return Some(schema);
    }

    let document = operation.json()?;
    document.get("message")?.get("payload").cloned()
}

fn first_message_payload(operation: &dyn OperationHandle) -> Option<Value> {
    let messages = operation.messages()?;
    let all = messages.all()?;
    let first = all.first()?;
    let payload = first.payload()?;
    payload.json()
}

/// Operation id: non-empty `meta().id`, then non-empty `id()`, then `"operation"`.
pub fn operation_id(operation: Option<&dyn OperationHandle>) -> String {
    let Some(op) = operation else {
        return DEFAULT_OPERATION_ID.to_string();
    };

    op.meta()
        .and_then(|m| m.id)
        .filter(|id| !id.is_empty())
        .or_else(|| op.id().filter(|id| !id.is_empty()))
        .unwrap_or_else(|| DEFAULT_OPERATION_ID.to_string())
}

/// Operation action: non-empty `meta().action`, else `fallback`.
pub fn operation_action(operation: Option<&dyn OperationHandle>, fallback: &str) -> String {
    operation
        .and_then(|op| op.meta())
        .and_then(|m| m.action)
        .filter(|action| !action.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Derive the metadata stamped on outgoing messages.
pub fn operation_metadata(
    operation: Option<&dyn OperationHandle>,
    fallback_type: &str,
) -> OperationMetadata {
    OperationMetadata {
        operation_id: operation_id(operation),
        operation_type: operation_action(operation, fallback_type),
    }
}

/// An operation backed by a plain JSON document.
///
/// Recognized shape (every key optional):
///
/// ```json
/// {
///   "id": "publishUserCreated",
///   "action": "send",
///   "meta": { "id": "...", "action": "..." },
///   "messages": [{ "payload": { "type": "object" } }],
///   "message": { "payload": { "type": "object" } }
/// }
/// ```
///
/// Top-level `id`/`action` fill in for a missing `meta` object.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonOperation {
    document: Value,
}

impl JsonOperation {
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    fn string_at(value: &Value, key: &str) -> Option<String> {
        value.get(key).and_then(Value::as_str).map(String::from)
    }
}

impl OperationHandle for JsonOperation {
    fn meta(&self) -> Option<OperationMeta> {
        let source = match self.document.get("meta") {
            Some(meta @ Value::Object(_)) => meta,
            _ => &self.document,
        };
        let meta = OperationMeta {
            id: Self::string_at(source, "id"),
            action: Self::string_at(source, "action"),
        };
        if meta == OperationMeta::default() {
            None
        } else {
            Some(meta)
        }
    }

    fn id(&self) -> Option<String> {
        Self::string_at(&self.document, "id")
    }

    fn messages(&self) -> Option<Box<dyn MessageList + '_>> {
        let messages = self.document.get("messages")?.as_array()?;
        Some(Box::new(JsonMessages { messages }))
    }

    fn json(&self) -> Option<Value> {
        Some(self.document.clone())
    }
}

struct JsonMessages<'a> {
    messages: &'a [Value],
}

impl MessageList for JsonMessages<'_> {
    fn all(&self) -> Option<Vec<Box<dyn Message + '_>>> {
        Some(
            self.messages
                .iter()
                .map(|message| Box::new(JsonMessage { message }) as Box<dyn Message + '_>)
                .collect(),
        )
    }
}

struct JsonMessage<'a> {
    message: &'a Value,
}

impl Message for JsonMessage<'_> {
    fn payload(&self) -> Option<Box<dyn PayloadHandle + '_>> {
        let payload = self.message.get("payload")?;
        Some(Box::new(JsonPayload { payload }))
    }
}

struct JsonPayload<'a> {
    payload: &'a Value,
}

impl PayloadHandle for JsonPayload<'_> {
    fn json(&self) -> Option<Value> {
        Some(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Handle exposing nothing at all.
    struct Bare;
    impl OperationHandle for Bare {}

    /// Handle whose message list has no `all()` result.
    struct NoMessages;
    impl MessageList for NoMessages {
        fn all(&self) -> Option<Vec<Box<dyn Message + '_>>> {
            None
        }
    }
    struct BrokenList;
    impl OperationHandle for BrokenList {
        fn messages(&self) -> Option<Box<dyn MessageList + '_>> {
            Some(Box::new(NoMessages))
        }
        fn json(&self) -> Option<Value> {
            Some(json!({ "message": { "payload": { "type": "string" } } }))
        }
    }

    #[test]
    fn resolves_first_message_payload() {
        let op = JsonOperation::new(json!({
            "messages": [
                { "payload": { "type": "object", "properties": { "name": { "type": "string" } } } },
                { "payload": { "type": "string" } }
            ],
            "message": { "payload": { "type": "number" } }
        }));
        assert_eq!(
            resolve_payload_schema(&op),
            Some(json!({ "type": "object", "properties": { "name": { "type": "string" } } }))
        );
    }

    #[test]
    fn falls_back_to_json_message_payload() {
        let op = JsonOperation::new(json!({
            "messages": [],
            "message": { "payload": { "type": "number" } }
        }));
        assert_eq!(resolve_payload_schema(&op), Some(json!({ "type": "number" })));

        assert_eq!(resolve_payload_schema(&BrokenList), Some(json!({ "type": "string" })));
    }

    #[test]
    fn first_message_without_payload_falls_back() {
        let op = JsonOperation::new(json!({
            "messages": [{ "name": "noPayload" }],
            "message": { "payload": { "type": "boolean" } }
        }));
        assert_eq!(resolve_payload_schema(&op), Some(json!({ "type": "boolean" })));
    }

    #[test]
    fn missing_accessors_yield_none() {
        assert_eq!(resolve_payload_schema(&Bare), None);
        assert_eq!(resolve_payload_schema(&JsonOperation::new(json!({}))), None);
        assert_eq!(
            resolve_payload_schema(&JsonOperation::new(json!({ "message": {} }))),
            None
        );
        assert_eq!(resolve_payload_schema(&JsonOperation::new(json!("op"))), None);
    }

    #[test]
    fn operation_id_precedence() {
        let op = JsonOperation::new(json!({ "meta": { "id": "fromMeta" }, "id": "fromId" }));
        assert_eq!(operation_id(Some(&op)), "fromMeta");

        let op = JsonOperation::new(json!({ "meta": { "id": "" }, "id": "fromId" }));
        assert_eq!(operation_id(Some(&op)), "fromId");

        let op = JsonOperation::new(json!({ "id": "" }));
        assert_eq!(operation_id(Some(&op)), "operation");

        assert_eq!(operation_id(Some(&Bare)), "operation");
        assert_eq!(operation_id(None), "operation");
    }

    #[test]
    fn operation_action_falls_back() {
        let op = JsonOperation::new(json!({ "meta": { "action": "receive" } }));
        assert_eq!(operation_action(Some(&op), "send"), "receive");

        let op = JsonOperation::new(json!({ "meta": { "action": "" } }));
        assert_eq!(operation_action(Some(&op), "send"), "send");

        assert_eq!(operation_action(Some(&Bare), "publish"), "publish");
        assert_eq!(operation_action(None, "send"), "send");
    }

    #[test]
    fn top_level_fields_stand_in_for_meta() {
        let op = JsonOperation::new(json!({ "id": "publishUserCreated", "action": "send" }));
        assert_eq!(
            operation_metadata(Some(&op), "receive"),
            OperationMetadata {
                operation_id: "publishUserCreated".into(),
                operation_type: "send".into(),
            }
        );
    }
}
