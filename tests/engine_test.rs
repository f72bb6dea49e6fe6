//! Integration tests for the try-it-out editor and submission flow.

use std::cell::RefCell;
use std::sync::Arc;

use asyncapi_try_it::{
    EditMode, JsonOperation, Message, MessageList, OperationHandle, OperationMeta, OperationSlot,
    PayloadHandle, SubmitError, Transport, TransportResponse, TryItOut, TryItOutOptions,
};
use serde_json::{json, Value};

/// Operation handle built from trait impls rather than a JSON document.
struct UserCreated;

struct UserMessages;
struct UserMessage;
struct UserPayload;

impl OperationHandle for UserCreated {
    fn meta(&self) -> Option<OperationMeta> {
        Some(OperationMeta {
            id: Some("publishUserCreated".into()),
            action: Some("send".into()),
        })
    }

    fn id(&self) -> Option<String> {
        Some("publishUserCreated".into())
    }

    fn messages(&self) -> Option<Box<dyn MessageList + '_>> {
        Some(Box::new(UserMessages))
    }
}

impl MessageList for UserMessages {
    fn all(&self) -> Option<Vec<Box<dyn Message + '_>>> {
        Some(vec![Box::new(UserMessage) as Box<dyn Message>])
    }
}

impl Message for UserMessage {
    fn payload(&self) -> Option<Box<dyn PayloadHandle + '_>> {
        Some(Box::new(UserPayload))
    }
}

impl PayloadHandle for UserPayload {
    fn json(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": { "name": { "type": "string" } }
        }))
    }
}

/// Records every request and answers with a canned response.
struct RecordingTransport {
    status: u16,
    body: String,
    requests: RefCell<Vec<(String, Value)>>,
}

impl RecordingTransport {
    fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl Transport for RecordingTransport {
    fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, SubmitError> {
        self.requests.borrow_mut().push((url.to_string(), body.clone()));
        Ok(TransportResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

fn mount(channel: Option<&str>) -> TryItOut {
    mount_with(channel, TryItOutOptions::default())
}

fn mount_with(channel: Option<&str>, options: TryItOutOptions) -> TryItOut {
    let op = UserCreated;
    let slot = OperationSlot {
        operation: Some(&op as &dyn OperationHandle),
        channel_name: channel,
        slot_type: Some("send"),
    };
    TryItOut::new(&slot, Arc::new(options))
}

mod submission {
    use super::*;

    #[test]
    fn submit_without_edits_posts_default_message() {
        let mut widget = mount(Some("users.created"));
        widget.toggle_opened();
        let transport = RecordingTransport::new(200, r#"{"ok":true}"#);

        widget.submit(&transport).unwrap();

        let requests = transport.requests.borrow();
        assert_eq!(requests.len(), 1);
        let (url, body) = &requests[0];
        assert_eq!(url, "/asyncapi/try");
        assert_eq!(body["channelName"], json!("users.created"));
        assert_eq!(
            body["message"],
            json!({
                "operation_id": "publishUserCreated",
                "operation_type": "send",
                "message": {}
            })
        );
        assert_eq!(body["options"]["sendToRealBroker"], json!(false));

        assert_eq!(widget.state().response, Some(json!({ "ok": true })));
        assert!(widget.state().error.is_empty());
        assert!(!widget.state().loading);
    }

    #[test]
    fn channel_defaults_to_unknown() {
        let mut widget = mount(None);
        let transport = RecordingTransport::new(200, "{}");
        widget.submit(&transport).unwrap();
        assert_eq!(transport.requests.borrow()[0].1["channelName"], json!("unknown"));
    }

    #[test]
    fn server_failure_message_is_surfaced() {
        let mut widget = mount(Some("users.created"));
        let transport =
            RecordingTransport::new(500, r#"{"ok":false,"message":"broker unavailable"}"#);

        let err = widget.submit(&transport).unwrap_err();

        assert!(matches!(err, SubmitError::RequestFailed { status: 500, .. }));
        assert_eq!(widget.state().error, "broker unavailable");
        assert_eq!(widget.state().response, None);
        assert!(!widget.state().loading);
    }

    #[test]
    fn server_failure_without_message_uses_status() {
        let mut widget = mount(Some("users.created"));
        let transport = RecordingTransport::new(503, r#"{"ok":false}"#);
        widget.submit(&transport).unwrap_err();
        assert_eq!(widget.state().error, "Request failed with status 503");
    }

    #[test]
    fn invalid_raw_json_never_reaches_the_network() {
        let mut widget = mount(Some("users.created"));
        widget.set_mode(EditMode::Raw);
        widget.set_raw("not json");
        let transport = RecordingTransport::new(200, "{}");

        let err = widget.submit(&transport).unwrap_err();

        assert!(matches!(err, SubmitError::InvalidJson { .. }));
        assert!(transport.requests.borrow().is_empty());
        assert!(!widget.state().error.is_empty());
        assert!(!widget.state().loading);
    }

    #[test]
    fn non_object_raw_json_is_rejected() {
        let mut widget = mount(Some("users.created"));
        widget.set_mode(EditMode::Raw);
        widget.set_raw("[]");
        let transport = RecordingTransport::new(200, "{}");

        widget.submit(&transport).unwrap_err();

        assert_eq!(widget.state().error, "Raw payload must be a JSON object");
        assert!(transport.requests.borrow().is_empty());
    }

    #[test]
    fn form_edits_reach_the_wire() {
        let mut widget = mount(Some("users.created"));
        widget.set_field("name", "Ada");
        widget.set_send_to_real_broker(true).unwrap();
        let transport = RecordingTransport::new(200, "{}");

        widget.submit(&transport).unwrap();

        let body = &transport.requests.borrow()[0].1;
        assert_eq!(body["message"]["message"], json!({ "name": "Ada" }));
        assert_eq!(body["options"]["sendToRealBroker"], json!(true));
    }

    #[test]
    fn user_edited_url_is_used() {
        let options = TryItOutOptions {
            show_endpoint_input: true,
            ..TryItOutOptions::default()
        };
        let mut widget = mount_with(Some("users.created"), options);
        widget.set_url("http://localhost:4000/custom").unwrap();
        let transport = RecordingTransport::new(200, "{}");
        widget.submit(&transport).unwrap();
        assert_eq!(transport.requests.borrow()[0].0, "http://localhost:4000/custom");
    }

    #[test]
    fn hidden_controls_keep_defaults_on_the_wire() {
        let options = TryItOutOptions {
            show_endpoint_input: false,
            show_real_broker_toggle: false,
            ..TryItOutOptions::default()
        };
        let mut widget = mount_with(Some("users.created"), options);
        assert!(widget.set_url("http://elsewhere.test/").is_err());
        assert!(widget.set_send_to_real_broker(true).is_err());

        let transport = RecordingTransport::new(200, "{}");
        widget.submit(&transport).unwrap();

        let requests = transport.requests.borrow();
        let (url, body) = &requests[0];
        assert_eq!(url, "/asyncapi/try");
        assert_eq!(body["options"]["sendToRealBroker"], json!(false));
    }
}

mod round_trip {
    use super::*;

    #[test]
    fn form_state_shows_up_in_raw_mode() {
        let mut widget = mount(Some("users.created"));
        widget.set_field("name", "Grace");
        widget.set_mode(EditMode::Raw);

        let raw: Value = serde_json::from_str(&widget.state().raw).unwrap();
        assert_eq!(raw["message"], json!({ "name": "Grace" }));
        assert_eq!(raw["operation_id"], json!("publishUserCreated"));
        assert_eq!(raw["operation_type"], json!("send"));

        // sending from raw mode sends the same content
        let transport = RecordingTransport::new(200, "{}");
        widget.submit(&transport).unwrap();
        assert_eq!(
            transport.requests.borrow()[0].1["message"]["message"],
            json!({ "name": "Grace" })
        );
    }

    #[test]
    fn raw_edits_do_not_leak_into_form() {
        let mut widget = mount(Some("users.created"));
        widget.set_mode(EditMode::Raw);
        widget.set_raw(r#"{"message":{"name":"raw"}}"#);
        widget.set_mode(EditMode::Form);
        assert!(widget.state().form_data.is_empty());
    }
}

#[cfg(feature = "remote")]
mod http {
    use super::*;
    use asyncapi_try_it::HttpTransport;

    #[test]
    fn posts_to_mock_server() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/asyncapi/try")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJson(json!({
                "channelName": "users.created",
                "message": {
                    "operation_id": "publishUserCreated",
                    "operation_type": "send",
                    "message": {}
                },
                "options": { "sendToRealBroker": false }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true,"delivered":1}"#)
            .create();

        let mut widget = mount(Some("users.created"));
        let transport = HttpTransport::new(Some(server.url())).unwrap();
        widget.submit(&transport).unwrap();

        mock.assert();
        assert_eq!(widget.state().response, Some(json!({ "ok": true, "delivered": 1 })));
    }

    #[test]
    fn broker_error_from_mock_server() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/asyncapi/try")
            .with_status(500)
            .with_body(r#"{"ok":false,"message":"broker unavailable"}"#)
            .create();

        let mut widget = mount(Some("users.created"));
        let transport = HttpTransport::new(Some(server.url())).unwrap();
        let err = widget.submit(&transport).unwrap_err();

        mock.assert();
        assert_eq!(err.exit_code(), 1);
        assert_eq!(widget.state().error, "broker unavailable");
        assert!(!widget.state().loading);
    }

    #[test]
    fn relative_url_without_base_fails() {
        let mut widget = mount(Some("users.created"));
        let transport = HttpTransport::new(None).unwrap();
        let err = widget.submit(&transport).unwrap_err();
        assert!(matches!(err, SubmitError::InvalidUrl { .. }));
        assert!(!widget.state().loading);
    }
}

#[test]
fn json_backed_operation_matches_trait_backed_one() {
    let doc = JsonOperation::new(json!({
        "meta": { "id": "publishUserCreated", "action": "send" },
        "messages": [{ "payload": { "type": "object", "properties": { "name": { "type": "string" } } } }]
    }));
    let slot = OperationSlot::new(&doc).channel_name("users.created").slot_type("send");
    let from_json = TryItOut::new(&slot, Arc::new(TryItOutOptions::default()));
    let from_traits = mount(Some("users.created"));

    assert_eq!(from_json.state(), from_traits.state());
    assert_eq!(from_json.payload_schema(), from_traits.payload_schema());
}
