//! Binary entry point for `tracker-assistant`.
//!
//! This module provides the command-line interface with options for the settings
//! file, the prompts directory, and logging verbosity. It loads the configuration,
//! answers the query, and prints the final response.

use clap::Parser;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing::warn;
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};
use tracker_assistant::base::{
    config::{Config, ConfigError},
    output,
    types::Void,
};

/// Tracker-assistant – answers questions about your Pivotal Tracker project.
///
/// Settings are read from a `.env` file (by default `../.env`) and the environment.
/// The query is classified first; questions about started or unstarted stories
/// are answered from live tracker data.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// The natural-language question to answer.
    query: Option<String>,
    /// Override the settings file path (optional).
    ///
    /// By default, the assistant loads `../.env` relative to the current directory.
    #[arg(short, long)]
    env_file: Option<std::path::PathBuf>,
    /// Override the prompts directory (optional).
    ///
    /// By default, `PROMPTS_DIR` or `./prompts/` is used.
    #[arg(short, long)]
    prompts_dir: Option<std::path::PathBuf>,
    /// Increase log verbosity (-v, -vv, etc.).
    ///
    /// Use multiple times to increase verbosity:
    /// - No flag: WARN level
    /// - -v: INFO level
    /// - -vv: DEBUG level
    /// - -vvv or more: TRACE level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Export spans over OTLP/HTTP.
    #[arg(long)]
    otlp: bool,
}

/// Main entry point for the tracker-assistant binary.
///
/// Sets up logging based on verbosity, loads configuration, and answers the query.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Void {
    let args = Args::parse();

    // Construct the level filter.

    let level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Prepare the log layer.

    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NONE);

    // Prepare the otlp layer.

    let provider = if args.otlp {
        let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
        Some(SdkTracerProvider::builder().with_simple_exporter(exporter).build())
    } else {
        None
    };

    let otel = provider.as_ref().map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer("tracker-assistant")));

    tracing_subscriber::registry().with(otel).with(level_filter).with(stderr).init();

    // Load the configuration.

    let config = match Config::load(args.env_file.as_deref(), args.prompts_dir.as_deref()) {
        Ok(config) => config,
        Err(err) => match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::MissingSettings(missing)) => {
                output::missing_settings(missing);
                shutdown_telemetry(provider);
                std::process::exit(1);
            }
            Some(ConfigError::EnvFileNotFound(_)) => {
                output::fatal(&err.to_string());
                shutdown_telemetry(provider);
                std::process::exit(1);
            }
            _ => {
                shutdown_telemetry(provider);
                return Err(err);
            }
        },
    };

    // Answer the query.

    let result = match args.query {
        Some(query) => tracker_assistant::start(config, &query).await.map(|response| output::final_response(&response)),
        None => {
            output::usage(env!("CARGO_BIN_NAME"));
            Ok(())
        }
    };

    shutdown_telemetry(provider);

    result
}

/// Flush and stop span export, if it was enabled.
fn shutdown_telemetry(provider: Option<SdkTracerProvider>) {
    if let Some(provider) = provider {
        if let Err(err) = provider.shutdown() {
            warn!("Failed to shut down the tracer provider: {err}");
        }
    }
}
