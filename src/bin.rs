//! Binary entry point for `lead-gen-crew`.
//!
//! This module provides the command-line interface with options for the business
//! description, configuration file path, output format, and logging verbosity.
//! It initializes logging, loads configuration, and runs the crew.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use lead_gen_crew::base::{config::Config, prompts::DEFAULT_BUSINESS_DESCRIPTION, types::Res, types::Void};
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use tracing::info;
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

const TROUBLESHOOTING_TIPS: &[&str] = &[
    "Verify `LEAD_GEN_LLM_API_KEY` is set in the environment or your .env file",
    "Check that `LEAD_GEN_LLM_API_BASE` and `LEAD_GEN_LLM_MODEL` name a reachable, OpenAI-compatible endpoint and model",
    "Re-run with -v or -vv for more detailed logs",
];

/// Lead-gen-crew – qualify leads, research them, and draft outreach with a crew of LLM agents.
///
/// Configuration can come from `config.toml`, a `.env` file, or `LEAD_GEN_*`
/// environment variables. Without a business description, a built-in example
/// business is used.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Override the config file path (optional).
    ///
    /// By default, the crew will look for a config file at `.hidden/config.toml`
    /// in the current directory.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// The business description, as text.
    #[arg(short, long, conflicts_with = "business_file")]
    business: Option<String>,
    /// Read the business description from a file.
    #[arg(long)]
    business_file: Option<PathBuf>,
    /// Also write a Markdown report of every task's output to this path.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Print the full crew output as JSON instead of the final result.
    #[arg(long)]
    json: bool,
    /// Export tracing spans over OTLP/HTTP.
    #[arg(long)]
    otlp: bool,
    /// Increase log verbosity (-v, -vv, etc.).
    ///
    /// Use multiple times to increase verbosity:
    /// - No flag: INFO level
    /// - -v: DEBUG level
    /// - -vv or more: TRACE level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Main entry point for the lead-gen-crew binary.
///
/// Sets up logging based on verbosity, loads configuration, and runs the crew.
#[tokio::main]
async fn main() -> Void {
    // Load `.env` into the process environment, if present.
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Construct the level filter.

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Prepare the log layer.

    let stdout = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    // Prepare the otlp layer, if requested.

    let otel = if args.otlp {
        let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
        let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_simple_exporter(exporter).build().tracer("lead-gen-crew");
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry().with(otel).with(level_filter).with(stdout).init();

    if let Err(err) = run(&args).await {
        eprintln!("\n❌ Error: {err}");
        eprintln!("\nDetailed error:\n{err:?}");
        eprintln!("\nTroubleshooting tips:");
        for tip in TROUBLESHOOTING_TIPS {
            eprintln!("- {tip}");
        }

        std::process::exit(1);
    }

    Ok(())
}

/// Load configuration, run the crew, and print or save the results.
async fn run(args: &Args) -> Void {
    let config = Config::load(args.config.as_deref())?;
    let business_description = read_business_description(args.business.as_deref(), args.business_file.as_deref())?;

    info!("Running the crew ...");
    let result = lead_gen_crew::start(config, &business_description).await?;

    if let Some(path) = &args.output {
        std::fs::write(path, result.to_markdown()).with_context(|| format!("Failed to write report to `{}`", path.display()))?;
        info!("Wrote report to `{}`", path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("\nFinal Results:");
        println!("{result}");
    }

    Ok(())
}

/// Pick the business description from the flags, falling back to the built-in example.
fn read_business_description(text: Option<&str>, file: Option<&Path>) -> Res<String> {
    if let Some(text) = text {
        return Ok(text.to_string());
    }

    if let Some(file) = file {
        return std::fs::read_to_string(file).with_context(|| format!("Failed to read business description from `{}`", file.display()));
    }

    info!("No business description given; using the built-in example business.");

    Ok(DEFAULT_BUSINESS_DESCRIPTION.to_string())
}
