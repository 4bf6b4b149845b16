//! CLI entry point for the trip data cleaning pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use std::path::PathBuf;
use tracing::error;
use trip_processing::{Pipeline, PipelineConfig, RunSummary};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Single-pass cleaning pipeline for taxi trip records",
    long_about = "Loads trip, surcharge and lookup files, normalizes and merges them,\n\
                  splits out null-carrying and negative-carrying rows, and writes a\n\
                  correlation summary of the cleaned set.\n\n\
                  EXAMPLES:\n  \
                  # Run with the conventional file layout under data/\n  \
                  trip-processing\n\n  \
                  # Point at other inputs and collect artifacts elsewhere\n  \
                  trip-processing --trip-data trips.csv --output run1/\n\n  \
                  # Machine-readable run summary\n  \
                  trip-processing --json | jq .cleaned_rows"
)]
struct Args {
    /// Path to the trip data CSV file
    #[arg(long, default_value = "data/yellow_tripdata.csv")]
    trip_data: PathBuf,

    /// Path to the surcharge JSON file
    #[arg(long, default_value = "data/surcharge_data.json")]
    surcharge_data: PathBuf,

    /// Path to the payment type lookup CSV
    #[arg(long, default_value = "data/payment_type.csv")]
    payment_lookup: PathBuf,

    /// Path to the vendor lookup CSV
    #[arg(long, default_value = "data/vendor_id.csv")]
    vendor_lookup: PathBuf,

    /// Path to the ratecode lookup CSV
    #[arg(long, default_value = "data/ratecode_id.csv")]
    ratecode_lookup: PathBuf,

    /// Output directory for all written artifacts
    #[arg(short, long, default_value = "outputs")]
    output: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,

    /// Output the run summary as JSON to stdout instead of text
    ///
    /// Disables all progress logs; only the final JSON is written.
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    for (flag, path) in [
        ("--trip-data", &args.trip_data),
        ("--surcharge-data", &args.surcharge_data),
        ("--payment-lookup", &args.payment_lookup),
        ("--vendor-lookup", &args.vendor_lookup),
        ("--ratecode-lookup", &args.ratecode_lookup),
    ] {
        if !path.exists() {
            return Err(anyhow!("Input file not found ({}): {}", flag, path.display()));
        }
    }

    let config = PipelineConfig::builder()
        .trip_data(&args.trip_data)
        .surcharge_data(&args.surcharge_data)
        .payment_lookup(&args.payment_lookup)
        .vendor_lookup(&args.vendor_lookup)
        .ratecode_lookup(&args.ratecode_lookup)
        .output_dir(&args.output)
        .build()?;

    let summary = match Pipeline::new(config).run() {
        Ok(summary) => summary,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            return Err(anyhow!("Pipeline failed: {}", e));
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_human_readable_summary(&summary, &args);
    Ok(())
}

/// Print a human-readable summary of the run.
///
/// This is the default output when `--json` is not specified; it uses
/// `println!` intentionally so the result is visible at any log level.
fn print_human_readable_summary(summary: &RunSummary, args: &Args) {
    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING RUN COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} trip rows, {} surcharge rows)",
        args.trip_data.display(),
        summary.trip_rows,
        summary.surcharge_rows
    );
    println!("Output: {}", args.output.display());
    println!();

    println!("Run Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!("  Merged rows: {}", summary.merged_rows);
    println!(
        "  Partitions: {} with nulls, {} with negatives, {} cleaned",
        summary.null_rows, summary.negative_rows, summary.cleaned_rows
    );
    println!();

    println!("Artifacts:");
    for artifact in &summary.artifacts {
        println!("  - {}", artifact.display());
    }
    println!();

    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}
