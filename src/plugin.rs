//! Host registration contract.
//!
//! A host exposes named component slots. The plugin registers one renderer
//! for the `operation` slot; the host calls it with the slot's context and
//! gets back a mounted [`TryItOut`] widget.

use std::sync::Arc;

use crate::config::TryItOutOptions;
use crate::editor::{OperationSlot, TryItOut};

pub const PLUGIN_NAME: &str = "asyncapi-try-it-plugin";
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Slot the renderer is registered under.
pub const OPERATION_SLOT: &str = "operation";

/// Context the host passes to a slot renderer.
#[derive(Default)]
pub struct SlotProps<'a> {
    pub schema: Option<OperationSlot<'a>>,
    /// Called when the user cancels the panel.
    pub on_close: Option<Box<dyn Fn() + 'a>>,
}

impl<'a> SlotProps<'a> {
    pub fn new(schema: OperationSlot<'a>) -> Self {
        Self {
            schema: Some(schema),
            on_close: None,
        }
    }

    pub fn on_close(mut self, on_close: impl Fn() + 'a) -> Self {
        self.on_close = Some(Box::new(on_close));
        self
    }

    /// Forward a cancel to the widget, notifying the host.
    pub fn cancel(&self, widget: &mut TryItOut) {
        widget.cancel(self.on_close.as_deref());
    }
}

/// Renders a slot into a widget.
pub type Renderer = Box<dyn Fn(&SlotProps<'_>) -> TryItOut + Send + Sync>;

/// What the plugin needs from its host.
pub trait HostApi {
    fn register_component(&mut self, slot: &str, renderer: Renderer);
}

/// Installable plugin descriptor.
#[derive(Debug, Clone)]
pub struct Plugin {
    pub name: &'static str,
    pub version: &'static str,
    options: Arc<TryItOutOptions>,
}

impl Plugin {
    pub fn options(&self) -> &TryItOutOptions {
        &self.options
    }

    /// Register the operation renderer with the host, exactly once.
    pub fn install(&self, api: &mut dyn HostApi) {
        let options = Arc::clone(&self.options);
        tracing::debug!(plugin = self.name, slot = OPERATION_SLOT, "registering component");
        api.register_component(
            OPERATION_SLOT,
            Box::new(move |props: &SlotProps<'_>| {
                let slot = props.schema.unwrap_or_default();
                TryItOut::new(&slot, Arc::clone(&options))
            }),
        );
    }
}

/// Create the try-it-out plugin with the given options.
pub fn create_try_it_out_plugin(options: TryItOutOptions) -> Plugin {
    Plugin {
        name: PLUGIN_NAME,
        version: PLUGIN_VERSION,
        options: Arc::new(options),
    }
}
