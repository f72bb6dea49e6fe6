//! Plugin options and endpoint resolution.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::types::AdditionalField;

pub const DEFAULT_ENDPOINT_BASE: &str = "asyncapi/try";
pub const DEFAULT_BUTTON_LABEL: &str = "Try it out";

/// Values an endpoint resolver can build a URL from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointContext {
    pub operation_id: String,
    pub operation_action: String,
    pub channel_name: String,
    pub slot_type: String,
    pub endpoint_base: String,
}

/// Host-supplied endpoint builder.
pub type EndpointResolver = Arc<dyn Fn(&EndpointContext) -> String + Send + Sync>;

/// Options recognized by the try-it-out widget.
///
/// Deserializes from the camelCase keys hosts already use; missing keys take
/// their defaults. `resolve_endpoint` can only be set from code.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TryItOutOptions {
    pub endpoint_base: String,
    pub show_endpoint_input: bool,
    pub show_payload_schema: bool,
    pub show_real_broker_toggle: bool,
    pub button_label: String,
    pub additional_fields: Vec<AdditionalField>,
    /// URL template with `{operationId}`, `{operationAction}`, `{channelName}`,
    /// `{type}` and `{endpointBase}` placeholders.
    pub endpoint_template: Option<String>,
    #[serde(skip)]
    pub resolve_endpoint: Option<EndpointResolver>,
}

impl Default for TryItOutOptions {
    fn default() -> Self {
        Self {
            endpoint_base: DEFAULT_ENDPOINT_BASE.to_string(),
            show_endpoint_input: false,
            show_payload_schema: false,
            show_real_broker_toggle: true,
            button_label: DEFAULT_BUTTON_LABEL.to_string(),
            additional_fields: Vec::new(),
            endpoint_template: None,
            resolve_endpoint: None,
        }
    }
}

impl fmt::Debug for TryItOutOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryItOutOptions")
            .field("endpoint_base", &self.endpoint_base)
            .field("show_endpoint_input", &self.show_endpoint_input)
            .field("show_payload_schema", &self.show_payload_schema)
            .field("show_real_broker_toggle", &self.show_real_broker_toggle)
            .field("button_label", &self.button_label)
            .field("additional_fields", &self.additional_fields)
            .field("endpoint_template", &self.endpoint_template)
            .field("resolve_endpoint", &self.resolve_endpoint.is_some())
            .finish()
    }
}

impl TryItOutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint_base(mut self, base: impl Into<String>) -> Self {
        self.endpoint_base = base.into();
        self
    }

    pub fn additional_fields(mut self, fields: Vec<AdditionalField>) -> Self {
        self.additional_fields = fields;
        self
    }

    pub fn endpoint_template(mut self, template: impl Into<String>) -> Self {
        self.endpoint_template = Some(template.into());
        self
    }

    pub fn resolve_endpoint<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&EndpointContext) -> String + Send + Sync + 'static,
    {
        self.resolve_endpoint = Some(Arc::new(resolver));
        self
    }

    /// Resolve the endpoint URL for a slot.
    ///
    /// The resolver closure wins over the template, which wins over the
    /// default `"/" + endpoint_base`.
    pub fn endpoint_for(&self, ctx: &EndpointContext) -> String {
        if let Some(resolver) = &self.resolve_endpoint {
            return resolver(ctx);
        }
        if let Some(template) = &self.endpoint_template {
            return expand_template(template, ctx);
        }
        format!("/{}", self.endpoint_base)
    }
}

fn expand_template(template: &str, ctx: &EndpointContext) -> String {
    template
        .replace("{operationId}", &ctx.operation_id)
        .replace("{operationAction}", &ctx.operation_action)
        .replace("{channelName}", &ctx.channel_name)
        .replace("{type}", &ctx.slot_type)
        .replace("{endpointBase}", &ctx.endpoint_base)
}
