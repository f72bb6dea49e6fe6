//! The try-it-out editor: form/raw reconciliation and message submission.
//!
//! A [`TryItOut`] owns all edit state for one operation slot. Three views of
//! the pending message coexist:
//!
//! - `form_data`, a field map edited through typed controls,
//! - `array_data`, an item list for array-typed payloads,
//! - `raw`, the full message document as editable JSON text.
//!
//! Which of `form_data`/`array_data` feeds the message is fixed by the
//! payload schema's shape, not by the visible mode. Every form or array edit
//! re-renders `raw` from the canonical form message, so switching to raw mode
//! always shows the latest form state. Raw edits never flow back into the form.
//!
//! Submission is split at its single suspension point: [`TryItOut::begin_submit`]
//! validates and builds the request, the caller performs the HTTP exchange,
//! and [`TryItOut::complete_submit`] records the outcome. [`TryItOut::submit`]
//! runs all three against a [`Transport`].

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::codec::{cast_input_value, ensure_raw_metadata, raw_document, stringify_raw, to_input_value};
use crate::config::{EndpointContext, TryItOutOptions};
use crate::error::SubmitError;
use crate::operation::{operation_metadata, resolve_payload_schema, OperationHandle};
use crate::schema::{
    array_item_schema, build_default_payload, classify, default_item_value, payload_properties,
    prepare_schema,
};
use crate::transport::{Transport, TransportResponse};
use crate::types::{
    EditMode, FieldType, OperationMetadata, PayloadShape, DEFAULT_CHANNEL_NAME, DEFAULT_SLOT_TYPE,
    OPERATION_ID_KEY, OPERATION_TYPE_KEY, PRIMITIVE_PAYLOAD_FIELD,
};

/// Host context for one operation slot, borrowed for a render cycle.
#[derive(Clone, Copy, Default)]
pub struct OperationSlot<'a> {
    pub operation: Option<&'a dyn OperationHandle>,
    pub channel_name: Option<&'a str>,
    /// Fallback operation action (`"send"` when absent).
    pub slot_type: Option<&'a str>,
}

impl<'a> OperationSlot<'a> {
    pub fn new(operation: &'a dyn OperationHandle) -> Self {
        Self {
            operation: Some(operation),
            channel_name: None,
            slot_type: None,
        }
    }

    pub fn channel_name(mut self, channel_name: &'a str) -> Self {
        self.channel_name = Some(channel_name);
        self
    }

    pub fn slot_type(mut self, slot_type: &'a str) -> Self {
        self.slot_type = Some(slot_type);
        self
    }
}

/// Everything derived from the slot; recomputed on each slot update.
#[derive(Debug, Clone, PartialEq)]
struct SlotView {
    metadata: OperationMetadata,
    channel_name: String,
    endpoint: String,
    payload_schema: Option<Value>,
    shape: PayloadShape,
    properties: Map<String, Value>,
}

impl SlotView {
    fn derive(slot: &OperationSlot<'_>, options: &TryItOutOptions) -> Self {
        let slot_type = slot.slot_type.unwrap_or(DEFAULT_SLOT_TYPE);
        let channel_name = slot.channel_name.unwrap_or(DEFAULT_CHANNEL_NAME).to_string();
        let metadata = operation_metadata(slot.operation, slot_type);

        let endpoint = options.endpoint_for(&EndpointContext {
            operation_id: metadata.operation_id.clone(),
            operation_action: metadata.operation_type.clone(),
            channel_name: channel_name.clone(),
            slot_type: slot_type.to_string(),
            endpoint_base: options.endpoint_base.clone(),
        });

        let resolved = slot.operation.and_then(resolve_payload_schema);
        let payload_schema = prepare_schema(resolved.as_ref());
        let shape = classify(payload_schema.as_ref());
        let properties = payload_properties(payload_schema.as_ref(), &options.additional_fields);

        Self {
            metadata,
            channel_name,
            endpoint,
            payload_schema,
            shape,
            properties,
        }
    }
}

/// Mutable state of one widget instance.
#[derive(Debug, Clone, PartialEq)]
pub struct EditState {
    pub opened: bool,
    pub mode: EditMode,
    pub form_data: Map<String, Value>,
    pub array_data: Vec<Value>,
    pub raw: String,
    pub url: String,
    pub send_to_real_broker: bool,
    pub loading: bool,
    /// Last submission error; empty when none.
    pub error: String,
    pub response: Option<Value>,
}

/// A renderable form control.
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub key: String,
    pub label: String,
    /// Control type; non-scalar schema types are edited as text.
    pub field_type: FieldType,
    pub schema: Value,
    /// Current input text.
    pub value: String,
    /// Checkbox state for boolean fields.
    pub checked: bool,
}

/// Identifies one submission between begin and complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionTicket(u64);

/// A validated request waiting to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission {
    pub ticket: SubmissionTicket,
    pub url: String,
    pub body: Value,
}

/// Headless try-it-out widget for one operation.
#[derive(Debug, Clone)]
pub struct TryItOut {
    options: Arc<TryItOutOptions>,
    view: SlotView,
    state: EditState,
    next_ticket: u64,
    in_flight: Option<SubmissionTicket>,
}

impl TryItOut {
    /// Mount a widget for `slot`, seeding the raw editor with the default payload.
    pub fn new(slot: &OperationSlot<'_>, options: Arc<TryItOutOptions>) -> Self {
        let view = SlotView::derive(slot, &options);
        let initial = build_default_payload(view.payload_schema.as_ref(), &options.additional_fields);
        let raw = stringify_raw(&raw_document(&view.metadata, Some(initial)));

        tracing::debug!(
            operation_id = %view.metadata.operation_id,
            shape = ?view.shape,
            endpoint = %view.endpoint,
            "mounted try-it-out widget"
        );

        let state = EditState {
            opened: false,
            mode: EditMode::Form,
            form_data: Map::new(),
            array_data: Vec::new(),
            raw,
            url: view.endpoint.clone(),
            send_to_real_broker: false,
            loading: false,
            error: String::new(),
            response: None,
        };

        Self {
            options,
            view,
            state,
            next_ticket: 0,
            in_flight: None,
        }
    }

    // --- Read access ---

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn options(&self) -> &TryItOutOptions {
        &self.options
    }

    pub fn metadata(&self) -> &OperationMetadata {
        &self.view.metadata
    }

    pub fn channel_name(&self) -> &str {
        &self.view.channel_name
    }

    /// Endpoint resolved from the slot, before any user edit.
    pub fn resolved_endpoint(&self) -> &str {
        &self.view.endpoint
    }

    /// Prepared (normalized and sanitized) payload schema.
    pub fn payload_schema(&self) -> Option<&Value> {
        self.view.payload_schema.as_ref()
    }

    pub fn shape(&self) -> PayloadShape {
        self.view.shape
    }

    /// Form properties including host-declared fields.
    pub fn payload_properties(&self) -> &Map<String, Value> {
        &self.view.properties
    }

    /// Form controls in declaration order, metadata keys hidden.
    pub fn form_fields(&self) -> Vec<FormField> {
        self.view
            .properties
            .iter()
            .filter(|(key, _)| key.as_str() != OPERATION_ID_KEY && key.as_str() != OPERATION_TYPE_KEY)
            .map(|(key, schema)| {
                let current = self.state.form_data.get(key);
                FormField {
                    key: key.clone(),
                    label: schema
                        .get("title")
                        .and_then(Value::as_str)
                        .unwrap_or(key)
                        .to_string(),
                    field_type: FieldType::of_schema(schema).unwrap_or(FieldType::String),
                    schema: schema.clone(),
                    value: to_input_value(current),
                    checked: current == Some(&Value::Bool(true)),
                }
            })
            .collect()
    }

    /// Item schema for array payloads.
    pub fn item_schema(&self) -> Option<&Value> {
        array_item_schema(self.view.payload_schema.as_ref())
    }

    /// Control type for array items (text when the item type is not scalar).
    pub fn item_type(&self) -> FieldType {
        self.item_schema()
            .and_then(FieldType::of_schema)
            .unwrap_or(FieldType::String)
    }

    /// Message content as the form currently describes it.
    ///
    /// `None` means no content at all (an unset scalar field).
    pub fn form_message(&self) -> Option<Value> {
        match self.view.shape {
            PayloadShape::Primitive(_) => self.state.form_data.get(PRIMITIVE_PAYLOAD_FIELD).cloned(),
            PayloadShape::Array => Some(Value::Array(self.state.array_data.clone())),
            PayloadShape::Null => Some(Value::Null),
            PayloadShape::Object => Some(Value::Object(self.state.form_data.clone())),
        }
    }

    /// Schema preview text when the host enabled it.
    pub fn schema_preview(&self) -> Option<String> {
        if !self.options.show_payload_schema {
            return None;
        }
        self.view
            .payload_schema
            .as_ref()
            .filter(|schema| !schema.is_null())
            .map(stringify_raw)
    }

    /// Last response, pretty-printed.
    pub fn response_text(&self) -> Option<String> {
        self.state.response.as_ref().map(stringify_raw)
    }

    // --- Lifecycle ---

    /// Re-derive from an updated slot, keeping user edits.
    ///
    /// The URL is reset only when the resolved endpoint itself changed, so a
    /// hand-edited URL survives updates that resolve to the same endpoint.
    /// A metadata change rewrites the metadata keys of the raw text in either
    /// mode and leaves every other key alone, so raw mode never shows a
    /// previous operation's identity.
    pub fn update_slot(&mut self, slot: &OperationSlot<'_>) {
        let next = SlotView::derive(slot, &self.options);

        if next.endpoint != self.view.endpoint {
            tracing::debug!(from = %self.view.endpoint, to = %next.endpoint, "resolved endpoint changed");
            self.state.url = next.endpoint.clone();
        }

        let metadata_changed = next.metadata != self.view.metadata;
        self.view = next;

        if metadata_changed {
            tracing::debug!(operation_id = %self.view.metadata.operation_id, "syncing raw metadata");
            self.state.raw = ensure_raw_metadata(&self.state.raw, &self.view.metadata);
        }
    }

    // --- Panel controls ---

    pub fn toggle_opened(&mut self) {
        self.state.opened = !self.state.opened;
    }

    /// Collapse the panel and notify the host, if it asked to be told.
    pub fn cancel(&mut self, on_close: Option<&dyn Fn()>) {
        self.state.opened = false;
        if let Some(on_close) = on_close {
            on_close();
        }
    }

    pub fn set_mode(&mut self, mode: EditMode) {
        self.state.mode = mode;
    }

    pub fn set_raw(&mut self, raw: impl Into<String>) {
        self.state.raw = raw.into();
    }

    /// Whether the endpoint URL input is shown and editable.
    pub fn endpoint_input_enabled(&self) -> bool {
        self.options.show_endpoint_input
    }

    /// Whether the "send to real broker" toggle is shown.
    pub fn real_broker_toggle_enabled(&self) -> bool {
        self.options.show_real_broker_toggle
    }

    /// Edit the target URL.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::ControlDisabled` (state untouched) unless
    /// `show_endpoint_input` is set.
    pub fn set_url(&mut self, url: impl Into<String>) -> Result<(), SubmitError> {
        if !self.endpoint_input_enabled() {
            return Err(SubmitError::ControlDisabled { control: "endpoint" });
        }
        self.state.url = url.into();
        Ok(())
    }

    /// Flip the real-broker toggle.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::ControlDisabled` (state untouched) when
    /// `show_real_broker_toggle` is off.
    pub fn set_send_to_real_broker(&mut self, enabled: bool) -> Result<(), SubmitError> {
        if !self.real_broker_toggle_enabled() {
            return Err(SubmitError::ControlDisabled { control: "real broker" });
        }
        self.state.send_to_real_broker = enabled;
        Ok(())
    }

    // --- Form editing ---

    /// Apply input text to a form field.
    ///
    /// Text that casts to nothing or to an empty string removes the field.
    pub fn set_field(&mut self, field: &str, text: &str) {
        let schema = self.view.properties.get(field);
        match cast_input_value(text, schema) {
            None => {
                self.state.form_data.shift_remove(field);
            }
            Some(Value::String(s)) if s.is_empty() => {
                self.state.form_data.shift_remove(field);
            }
            Some(value) => {
                self.state.form_data.insert(field.to_string(), value);
            }
        }
        self.refresh_raw_mirror();
    }

    /// Append an item holding the item type's zero value.
    pub fn push_item(&mut self) {
        let item = default_item_value(self.item_schema());
        self.state.array_data.push(item);
        self.refresh_raw_mirror();
    }

    /// Remove the item at `index`. Out-of-range indexes are ignored.
    pub fn remove_item(&mut self, index: usize) {
        if index >= self.state.array_data.len() {
            tracing::debug!(index, "remove_item index out of range");
            return;
        }
        self.state.array_data.remove(index);
        self.refresh_raw_mirror();
    }

    /// Replace the item at `index` with input text cast against the item schema.
    ///
    /// Numeric items cleared to empty text become `null`. Out-of-range
    /// indexes are ignored.
    pub fn update_item(&mut self, index: usize, text: &str) {
        let value = cast_input_value(text, self.item_schema()).unwrap_or(Value::Null);
        match self.state.array_data.get_mut(index) {
            Some(slot) => *slot = value,
            None => {
                tracing::debug!(index, "update_item index out of range");
                return;
            }
        }
        self.refresh_raw_mirror();
    }

    fn refresh_raw_mirror(&mut self) {
        let doc = raw_document(&self.view.metadata, self.form_message());
        self.state.raw = stringify_raw(&doc);
    }

    // --- Submission ---

    /// Message content taken from the active edit mode.
    fn message_content(&self) -> Result<Option<Value>, SubmitError> {
        match self.state.mode {
            EditMode::Raw => {
                let parsed: Value = serde_json::from_str(&self.state.raw)
                    .map_err(|source| SubmitError::InvalidJson { source })?;
                match parsed {
                    Value::Object(mut map) => Ok(map.shift_remove("message")),
                    _ => Err(SubmitError::NotAnObject),
                }
            }
            EditMode::Form => Ok(self.form_message()),
        }
    }

    /// Enter loading state and build the outgoing request.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::InFlight` (state untouched) while another
    /// submission is outstanding. Raw text that is not JSON, or not a JSON
    /// object, fails with `InvalidJson` / `NotAnObject`; the error is recorded
    /// and loading cleared without any request being built.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SubmitError> {
        if self.in_flight.is_some() {
            tracing::warn!("submission rejected: another one is in flight");
            return Err(SubmitError::InFlight);
        }

        self.state.loading = true;
        self.state.error.clear();
        self.state.response = None;

        let content = match self.message_content() {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(error = %e, "raw payload rejected");
                self.state.error = e.to_string();
                self.state.loading = false;
                return Err(e);
            }
        };

        let message = raw_document(&self.view.metadata, content);
        let body = json!({
            "channelName": self.view.channel_name,
            "message": message,
            "options": {
                "sendToRealBroker": self.state.send_to_real_broker,
                "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            }
        });

        let ticket = SubmissionTicket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight = Some(ticket);

        tracing::info!(
            url = %self.state.url,
            operation_id = %self.view.metadata.operation_id,
            channel = %self.view.channel_name,
            "submitting test message"
        );

        Ok(PendingSubmission {
            ticket,
            url: self.state.url.clone(),
            body,
        })
    }

    /// Record the outcome of a request started by [`begin_submit`](Self::begin_submit).
    ///
    /// A successful status stores the parsed body as the response. Any
    /// failure is stored as the error text. Loading is always cleared.
    /// Completions for a ticket that is no longer in flight are dropped.
    pub fn complete_submit(
        &mut self,
        ticket: SubmissionTicket,
        result: Result<TransportResponse, SubmitError>,
    ) -> Result<(), SubmitError> {
        if self.in_flight != Some(ticket) {
            tracing::debug!(?ticket, "dropping stale submission result");
            return Ok(());
        }
        self.in_flight = None;

        let outcome = interpret_response(result);
        self.state.loading = false;

        match outcome {
            Ok(body) => {
                tracing::info!("test message accepted");
                self.state.response = Some(body);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "test message failed");
                self.state.error = e.to_string();
                Err(e)
            }
        }
    }

    /// Build, send and record one submission.
    ///
    /// The outcome is also available through [`state`](Self::state).
    pub fn submit<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<(), SubmitError> {
        let pending = self.begin_submit()?;
        let result = transport.post_json(&pending.url, &pending.body);
        self.complete_submit(pending.ticket, result)
    }
}

fn interpret_response(result: Result<TransportResponse, SubmitError>) -> Result<Value, SubmitError> {
    let response = result?;
    let body: Value = serde_json::from_str(&response.body)
        .map_err(|source| SubmitError::InvalidResponse { source })?;
    if !response.is_success() {
        return Err(SubmitError::request_failed(response.status, &body));
    }
    Ok(body)
}
