//! fninput CLI — drive an input adapter from descriptor files.
//!
//! Usage:
//!   fninput convert --descriptor sig.yaml --value '<json>' [--header k=v] [--stream many]
//!   fninput describe --descriptor sig.yaml

use clap::{Parser, Subcommand, ValueEnum};
use fninput::{
    AdapterConfig, AdapterError, Envelope, InputAdapter, InputDescriptor, InputValue, Value,
};
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "fninput",
    version,
    about = "Adapt invocation input to a function's declared types"
)]
struct Cli {
    /// Log conversion decisions to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a JSON-encoded value and print the result as JSON
    Convert {
        /// Path to the YAML input descriptor
        #[arg(long)]
        descriptor: PathBuf,
        /// Path to a YAML adapter configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// The input value, as JSON
        #[arg(long)]
        value: String,
        /// Wrap the value in an envelope carrying this header (key=value)
        #[arg(long = "header", value_parser = parse_header)]
        headers: Vec<(String, serde_json::Value)>,
        /// Deliver the value as a stream
        #[arg(long, value_enum)]
        stream: Option<StreamArg>,
    },
    /// Print the declared slots of a descriptor
    Describe {
        /// Path to the YAML input descriptor
        #[arg(long)]
        descriptor: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StreamArg {
    Single,
    Many,
}

/// Parse `key=value`; the value is taken as JSON when it parses, else as a string.
fn parse_header(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, found '{}'", raw))?;
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
    {
        eprintln!("Warning: logging unavailable: {}", e);
    }
}

fn load_descriptor(path: &PathBuf) -> Result<Arc<InputDescriptor>, String> {
    InputDescriptor::from_path(path)
        .map(Arc::new)
        .map_err(|e| format!("Failed to load descriptor '{}': {}", path.display(), e))
}

fn wrap(value: Value, headers: &[(String, serde_json::Value)]) -> Value {
    if headers.is_empty() {
        return value;
    }
    let envelope = headers
        .iter()
        .fold(Envelope::builder(value), |builder, (k, v)| {
            builder.header(k.clone(), v.clone())
        })
        .build();
    Value::Envelope(envelope)
}

fn build_input(
    json: serde_json::Value,
    headers: &[(String, serde_json::Value)],
    stream: Option<StreamArg>,
    descriptor: &InputDescriptor,
) -> Result<InputValue, String> {
    match (stream, json) {
        (Some(StreamArg::Many), serde_json::Value::Array(items)) => Ok(InputValue::from_values(
            items
                .into_iter()
                .map(|item| wrap(Value::from_json(item), headers))
                .collect(),
        )),
        (Some(StreamArg::Many), _) => Err("--stream many requires a JSON array value".to_string()),
        (Some(StreamArg::Single), json) => {
            Ok(InputValue::single(wrap(Value::from_json(json), headers)))
        }
        (None, serde_json::Value::Array(items)) if descriptor.is_composite() => {
            let elements = items
                .into_iter()
                .map(|item| InputValue::Scalar(wrap(Value::from_json(item), headers)))
                .collect();
            InputValue::composite(elements).map_err(|e| e.to_string())
        }
        (None, json) => Ok(InputValue::Scalar(wrap(Value::from_json(json), headers))),
    }
}

/// Render a converted input as JSON, draining streams.
fn render(input: InputValue) -> BoxFuture<'static, Result<serde_json::Value, AdapterError>> {
    async move {
        match input {
            InputValue::Scalar(value) => Ok(value.to_json()),
            InputValue::Composite(composite) => {
                let mut rendered = Vec::with_capacity(composite.arity());
                for element in composite.into_elements() {
                    rendered.push(render(element).await?);
                }
                Ok(serde_json::Value::Array(rendered))
            }
            InputValue::SingleStream(mut stream) | InputValue::MultiStream(mut stream) => {
                let mut rendered = Vec::new();
                while let Some(item) = stream.next().await {
                    rendered.push(item?.to_json());
                }
                Ok(serde_json::Value::Array(rendered))
            }
        }
    }
    .boxed()
}

async fn cmd_convert(
    descriptor: PathBuf,
    config: Option<PathBuf>,
    value: String,
    headers: Vec<(String, serde_json::Value)>,
    stream: Option<StreamArg>,
) -> i32 {
    let descriptor = match load_descriptor(&descriptor) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let config = match config {
        Some(path) => match AdapterConfig::from_path(&path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: failed to load config '{}': {}", path.display(), e);
                return 1;
            }
        },
        None => AdapterConfig::default(),
    };
    let json: serde_json::Value = match serde_json::from_str(&value) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error: --value is not valid JSON: {}", e);
            return 1;
        }
    };
    let input = match build_input(json, &headers, stream, &descriptor) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let adapter = InputAdapter::with_defaults(descriptor).with_config(config);
    let converted = match adapter.convert(input) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match render(converted).await {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_describe(descriptor: PathBuf) -> i32 {
    let descriptor = match load_descriptor(&descriptor) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let adapter = InputAdapter::with_defaults(descriptor.clone());
    println!("unit:   {}", descriptor.unit_label());
    println!("input:  {}", descriptor.input().describe());

    let count = match adapter.input_argument_count() {
        Ok(count) => count,
        Err(_) => {
            println!("slots:  1 (simple)");
            return 0;
        }
    };
    println!("slots:  {}", count);
    println!("{:>5}  {:<32}  {}", "INDEX", "DECLARED", "RAW");
    for index in 0..count {
        match (
            adapter.input_argument_type(index),
            adapter.input_argument_raw_type(index),
        ) {
            (Ok(declared), Ok(raw)) => {
                println!("{:>5}  {:<32}  {}", index, declared.describe(), raw)
            }
            (Err(e), _) | (_, Err(e)) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        }
    }
    0
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let code = match cli.command {
        Commands::Convert {
            descriptor,
            config,
            value,
            headers,
            stream,
        } => cmd_convert(descriptor, config, value, headers, stream).await,
        Commands::Describe { descriptor } => cmd_describe(descriptor),
    };
    std::process::exit(code);
}
