//! CLI entry point for the listing analytics pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use polars::prelude::*;
use serde_json::Value;
use stay_processing::{PipelineConfig, RecordErrorPolicy, SessionState};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Listing analytics pipeline",
    long_about = "Flattens a dump of raw listing documents, preprocesses the table\n\
                  and writes the advanced-analysis aggregate views as CSV.\n\n\
                  EXAMPLES:\n  \
                  # Process a JSON dump into ./outputs\n  \
                  stay-processing -i listings.json\n\n  \
                  # Tolerate bad records and lower the review cutoff\n  \
                  stay-processing -i listings.ndjson --skip-bad-records --min-reviews 50"
)]
struct Args {
    /// Path to the listing dump (JSON array, or one document per line)
    #[arg(short, long)]
    input: String,

    /// Output directory for the aggregate views
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Skip records that fail flattening instead of aborting
    #[arg(long)]
    skip_bad_records: bool,

    /// Minimum review count for the preferred-property view
    #[arg(long, default_value = "100")]
    min_reviews: i64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Load raw listing documents from a JSON array file or an NDJSON file.
fn load_records(path: &str) -> Result<Vec<Value>> {
    let file = File::open(path)?;

    if path.ends_with(".ndjson") || path.ends_with(".jsonl") {
        let reader = BufReader::new(file);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        return Ok(records);
    }

    let parsed: Value = serde_json::from_reader(BufReader::new(file))?;
    match parsed {
        Value::Array(records) => Ok(records),
        _ => Err(anyhow!("expected a JSON array of listing documents")),
    }
}

fn write_csv(df: &DataFrame, dir: &str, name: &str) -> Result<String> {
    let path = Path::new(dir).join(format!("{name}.csv"));
    let mut file = File::create(&path)?;
    CsvWriter::new(&mut file).finish(&mut df.clone())?;
    Ok(path.display().to_string())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }
    std::fs::create_dir_all(&args.output)?;

    let policy = if args.skip_bad_records {
        RecordErrorPolicy::Skip
    } else {
        RecordErrorPolicy::Abort
    };
    let config = PipelineConfig::builder()
        .record_error_policy(policy)
        .min_reviews_for_preference(args.min_reviews)
        .build()?;

    info!("Loading listing dump from: {}", args.input);
    let records = load_records(&args.input)?;
    info!("Loaded {} raw documents", records.len());

    let mut session = SessionState::new(config);

    let fetched = session.fetch(records)?;
    if fetched.skipped_records > 0 {
        warn!("Skipped {} bad records", fetched.skipped_records);
    }
    info!(
        "Flattened listing table: {} rows, {} columns",
        fetched.summary.row_count, fetched.summary.column_count
    );

    session.preprocess()?;
    let views = session.aggregate()?;

    let outputs = [
        ("country_mean_price", &views.country_mean_price),
        ("property_type_mean_price", &views.property_type_mean_price),
        ("country_availability_mean", &views.country_availability_mean),
        (
            "room_type_property_mean_price",
            &views.room_type_property_mean_price,
        ),
        ("listing_count_by_property", &views.listing_count_by_property),
        (
            "preferred_property_by_country",
            &views.preferred_property_by_country,
        ),
    ];
    for (name, view) in outputs {
        let path = write_csv(view, &args.output, name)?;
        info!("Wrote {}", path);
    }

    info!("Done");
    Ok(())
}
