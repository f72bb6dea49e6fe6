//! AsyncAPI Try-It-Out
//!
//! Compose a test message for a messaging operation from its payload schema,
//! edit it as a form or as raw JSON, and POST it to a try-out endpoint.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use asyncapi_try_it::{EditMode, JsonOperation, OperationSlot, TryItOut, TryItOutOptions};
//! use serde_json::json;
//!
//! let operation = JsonOperation::new(json!({
//!     "meta": { "id": "publishUserCreated", "action": "send" },
//!     "messages": [{
//!         "payload": {
//!             "type": "object",
//!             "properties": { "name": { "type": "string", "description": "Display name" } }
//!         }
//!     }]
//! }));
//!
//! let slot = OperationSlot::new(&operation).channel_name("users.created");
//! let mut widget = TryItOut::new(&slot, Arc::new(TryItOutOptions::default()));
//!
//! widget.set_field("name", "Ada");
//! widget.set_mode(EditMode::Raw);
//!
//! let raw: serde_json::Value = serde_json::from_str(&widget.state().raw).unwrap();
//! assert_eq!(raw["operation_id"], "publishUserCreated");
//! assert_eq!(raw["message"], json!({ "name": "Ada" }));
//!
//! let pending = widget.begin_submit().unwrap();
//! assert_eq!(pending.url, "/asyncapi/try");
//! assert_eq!(pending.body["channelName"], "users.created");
//! ```
//!
//! # Payload shapes
//!
//! | Schema | Form | Message content |
//! |--------|------|-----------------|
//! | `string`/`number`/`integer`/`boolean` | one `message` field | the scalar |
//! | `array` | item list | the items |
//! | `null` | none | `null` |
//! | anything else | one field per property | the field map |
//!
//! # Wire format
//!
//! ```json
//! {
//!   "channelName": "users.created",
//!   "message": { "operation_id": "...", "operation_type": "send", "message": {} },
//!   "options": { "sendToRealBroker": false, "timestamp": "2024-01-01T00:00:00.000Z" }
//! }
//! ```

mod codec;
mod config;
mod editor;
mod error;
mod loader;
mod operation;
mod plugin;
mod schema;
mod transport;
mod types;

pub use codec::{cast_input_value, ensure_raw_metadata, raw_document, stringify_raw, to_input_value};
pub use config::{EndpointContext, EndpointResolver, TryItOutOptions};
pub use editor::{
    EditState, FormField, OperationSlot, PendingSubmission, SubmissionTicket, TryItOut,
};
pub use error::{ErrorKind, LoadError, SubmitError, NOT_AN_OBJECT_MESSAGE, UNKNOWN_ERROR_MESSAGE};
pub use loader::{load_json, load_json_str, load_operation, load_options, read_file};
pub use operation::{
    operation_action, operation_id, operation_metadata, resolve_payload_schema, JsonOperation,
    Message, MessageList, OperationHandle, OperationMeta, PayloadHandle,
};
pub use plugin::{create_try_it_out_plugin, HostApi, Plugin, Renderer, SlotProps};
pub use schema::{
    build_default_payload, classify, extract_schema_properties, is_array_schema,
    is_primitive_schema, normalize, payload_properties, prepare_schema, sanitize,
};
pub use transport::{Transport, TransportResponse};
pub use types::{
    AdditionalField, EditMode, FieldType, OperationMetadata, PayloadShape, PRIMITIVE_PAYLOAD_FIELD,
};

#[cfg(feature = "remote")]
pub use transport::{join_url, HttpTransport};
