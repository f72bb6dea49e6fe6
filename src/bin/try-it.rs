//! Try-It-Out CLI
//!
//! Terminal front end for composing and sending AsyncAPI test messages.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use asyncapi_try_it::{
    load_operation, load_options, read_file, stringify_raw, EditMode, JsonOperation,
    OperationHandle, OperationSlot, PayloadShape, TryItOut, TryItOutOptions,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "try-it")]
#[command(about = "Compose and send test messages for AsyncAPI operations")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments shared by every command that mounts a widget.
#[derive(Args)]
struct SlotArgs {
    /// Operation document (JSON)
    operation: PathBuf,

    /// Channel the operation belongs to
    #[arg(long)]
    channel: Option<String>,

    /// Fallback operation action when the document has none
    #[arg(long = "type")]
    slot_type: Option<String>,

    /// Options file with camelCase keys (endpointBase, additionalFields, ...)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Endpoint base path (overrides the options file)
    #[arg(long)]
    endpoint_base: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the form, raw JSON seed and endpoint derived from an operation
    Inspect {
        #[command(flatten)]
        slot: SlotArgs,

        /// Also print the prepared payload schema
        #[arg(long)]
        schema: bool,

        /// Output as a single JSON object
        #[arg(long)]
        json: bool,
    },

    /// Build a test message and POST it to the try-out endpoint
    Send {
        #[command(flatten)]
        slot: SlotArgs,

        /// Form field assignment (repeatable)
        #[arg(long = "set", value_name = "FIELD=VALUE", conflicts_with = "raw")]
        set: Vec<String>,

        /// Array item (repeatable, for array payloads)
        #[arg(long = "item", value_name = "VALUE", conflicts_with = "raw")]
        items: Vec<String>,

        /// Raw JSON message document; `-` reads stdin
        #[arg(long, value_name = "FILE")]
        raw: Option<String>,

        /// Endpoint URL (overrides the resolved endpoint; needs showEndpointInput)
        #[arg(long)]
        url: Option<String>,

        /// Base URL that endpoints resolve against (`/path` replaces its path)
        #[arg(long)]
        base_url: Option<String>,

        /// Publish to the real broker (refused when showRealBrokerToggle is off)
        #[arg(long)]
        real_broker: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Inspect { slot, schema, json } => run_inspect(&slot, schema, json),
        Commands::Send {
            slot,
            set,
            items,
            raw,
            url,
            base_url,
            real_broker,
        } => run_send(SendArgs {
            slot,
            set,
            items,
            raw,
            url,
            base_url,
            real_broker,
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn load_slot_inputs(args: &SlotArgs) -> Result<(JsonOperation, TryItOutOptions), u8> {
    let operation = load_operation(&args.operation).map_err(|e| {
        eprintln!("Error: loading operation: {}", e);
        e.exit_code() as u8
    })?;

    let mut options = match &args.config {
        Some(path) => load_options(path).map_err(|e| {
            eprintln!("Error: loading options: {}", e);
            e.exit_code() as u8
        })?,
        None => TryItOutOptions::default(),
    };
    if let Some(base) = &args.endpoint_base {
        options.endpoint_base = base.clone();
    }

    Ok((operation, options))
}

fn mount<'a>(args: &'a SlotArgs, operation: &'a JsonOperation, options: TryItOutOptions) -> TryItOut {
    let slot = OperationSlot {
        operation: Some(operation as &dyn OperationHandle),
        channel_name: args.channel.as_deref(),
        slot_type: args.slot_type.as_deref(),
    };
    TryItOut::new(&slot, Arc::new(options))
}

fn shape_name(shape: PayloadShape) -> &'static str {
    match shape {
        PayloadShape::Primitive(t) => t.as_str(),
        PayloadShape::Array => "array",
        PayloadShape::Null => "null",
        PayloadShape::Object => "object",
    }
}

fn run_inspect(args: &SlotArgs, show_schema: bool, json_output: bool) -> Result<(), u8> {
    let (operation, options) = load_slot_inputs(args)?;
    let widget = mount(args, &operation, options);
    let metadata = widget.metadata();
    let show_schema = show_schema || widget.options().show_payload_schema;
    let raw: serde_json::Value =
        serde_json::from_str(&widget.state().raw).unwrap_or(serde_json::Value::Null);

    if json_output {
        let fields: Vec<serde_json::Value> = widget
            .form_fields()
            .into_iter()
            .map(|f| {
                serde_json::json!({
                    "key": f.key,
                    "label": f.label,
                    "type": f.field_type.as_str(),
                })
            })
            .collect();
        let mut output = serde_json::json!({
            "operationId": metadata.operation_id,
            "operationType": metadata.operation_type,
            "channelName": widget.channel_name(),
            "endpoint": widget.state().url,
            "shape": shape_name(widget.shape()),
            "fields": fields,
            "raw": raw,
        });
        if show_schema {
            output["schema"] = widget.payload_schema().cloned().unwrap_or_default();
        }
        let text = serde_json::to_string_pretty(&output).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", text);
        return Ok(());
    }

    println!("Operation: {} ({})", metadata.operation_id, metadata.operation_type);
    println!("Channel:   {}", widget.channel_name());
    println!("Endpoint:  {}", widget.state().url);
    println!("Payload:   {}", shape_name(widget.shape()));

    match widget.shape() {
        PayloadShape::Array => {
            println!("\nItems: {}", widget.item_type().as_str());
        }
        _ => {
            let fields = widget.form_fields();
            if !fields.is_empty() {
                println!("\nFields:");
                for field in fields {
                    if field.label == field.key {
                        println!("  {} ({})", field.key, field.field_type.as_str());
                    } else {
                        println!(
                            "  {} ({}) - {}",
                            field.key,
                            field.field_type.as_str(),
                            field.label
                        );
                    }
                }
            }
        }
    }

    println!("\nRaw JSON:\n{}", widget.state().raw);

    if show_schema {
        if let Some(schema) = widget.payload_schema() {
            println!("\nPayload schema:\n{}", stringify_raw(schema));
        }
    }

    Ok(())
}

struct SendArgs {
    slot: SlotArgs,
    set: Vec<String>,
    items: Vec<String>,
    raw: Option<String>,
    url: Option<String>,
    base_url: Option<String>,
    real_broker: bool,
}

fn read_raw_source(source: &str) -> Result<String, u8> {
    if source == "-" {
        return std::io::read_to_string(std::io::stdin()).map_err(|e| {
            eprintln!("Error: reading stdin: {}", e);
            3u8
        });
    }
    read_file(Path::new(source)).map_err(|e| {
        eprintln!("Error: loading raw payload: {}", e);
        e.exit_code() as u8
    })
}

fn apply_edits(widget: &mut TryItOut, args: &SendArgs) -> Result<(), u8> {
    for assignment in &args.set {
        let Some((field, value)) = assignment.split_once('=') else {
            eprintln!("Error: expected FIELD=VALUE, got '{}'", assignment);
            return Err(2);
        };
        if !widget.payload_properties().contains_key(field) {
            tracing::warn!(field, "field is not declared by the payload schema");
        }
        widget.set_field(field, value);
    }

    if !args.items.is_empty() && widget.shape() != PayloadShape::Array {
        eprintln!("Error: --item requires an array payload schema");
        return Err(2);
    }
    for item in &args.items {
        widget.push_item();
        let index = widget.state().array_data.len() - 1;
        widget.update_item(index, item);
    }

    if let Some(source) = &args.raw {
        let text = read_raw_source(source)?;
        widget.set_mode(EditMode::Raw);
        widget.set_raw(text);
    }

    if let Some(url) = &args.url {
        widget.set_url(url.clone()).map_err(|e| {
            eprintln!("Error: --url: {} (enable showEndpointInput in --config)", e);
            e.exit_code() as u8
        })?;
    }
    if args.real_broker {
        widget.set_send_to_real_broker(true).map_err(|e| {
            eprintln!("Error: --real-broker: {} (enable showRealBrokerToggle in --config)", e);
            e.exit_code() as u8
        })?;
    }
    Ok(())
}

#[cfg(feature = "remote")]
fn run_send(args: SendArgs) -> Result<(), u8> {
    use asyncapi_try_it::HttpTransport;

    let (operation, options) = load_slot_inputs(&args.slot)?;
    let mut widget = mount(&args.slot, &operation, options);
    widget.toggle_opened();
    apply_edits(&mut widget, &args)?;

    let transport = HttpTransport::new(args.base_url.clone()).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    match widget.submit(&transport) {
        Ok(()) => {
            if let Some(text) = widget.response_text() {
                println!("{}", text);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", widget.state().error);
            Err(e.exit_code() as u8)
        }
    }
}

#[cfg(not(feature = "remote"))]
fn run_send(_args: SendArgs) -> Result<(), u8> {
    eprintln!("Error: sending requires the `remote` feature");
    Err(2)
}
