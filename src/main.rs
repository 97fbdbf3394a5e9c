//! CLI entry point for the Poutine Index pipeline.
//!
//! Provides subcommands for validating raw price observations, aggregating
//! validated observations into city statistics, and running both in sequence.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use poutine_index::analyzers::writetos3::{DATASET_KEY, publish_dataset};
use poutine_index::analyzers::{CityDataset, DatasetSummary, aggregate_cities};
use poutine_index::config::ValidationConfig;
use poutine_index::fetch::load_source;
use poutine_index::observation::RawObservation;
use poutine_index::output::{ValidatedSnapshot, append_findings, log_findings, write_json};
use poutine_index::parser::{parse_observations, parse_registry, parse_wages};
use poutine_index::validators::{ExclusionPolicy, ValidationReport, validate};
use std::ffi::OsStr;
use std::path::Path;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Structural errors were found (or warnings under `--strict`).
const EXIT_INVALID: u8 = 1;
/// Nothing survived validation, so aggregation was skipped.
const EXIT_NO_DATA: u8 = 2;

#[derive(Parser)]
#[command(name = "poutine_index")]
#[command(about = "Validate poutine prices and build the city affordability index", long_about = None)]
struct Cli {
    /// Date to validate against, YYYY-MM-DD (defaults to today)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate raw price observations and write the validated snapshot
    Validate(ValidateArgs),
    /// Aggregate a validated snapshot into per-city statistics
    Aggregate {
        /// Validated snapshot, path or URL
        #[arg(short, long, default_value = "data/prices_validated.json")]
        input: String,

        #[command(flatten)]
        aggregate: AggregateArgs,
    },
    /// Validate, then aggregate whatever survived
    Run {
        #[command(flatten)]
        validate: ValidateArgs,

        #[command(flatten)]
        aggregate: AggregateArgs,
    },
}

#[derive(Args)]
struct ValidateArgs {
    /// Raw observations, path or URL
    #[arg(long = "raw", default_value = "data/prices_raw.json")]
    raw: String,

    /// Where to write the validated snapshot
    #[arg(long, default_value = "data/prices_validated.json")]
    validated: String,

    /// Treat warnings as exclusionary
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Only log the summary, not individual findings
    #[arg(short, long, default_value_t = false)]
    quiet: bool,

    /// Optional: CSV file to append findings to
    #[arg(long)]
    findings_csv: Option<String>,

    /// Optional: JSON file overriding validation thresholds
    #[arg(long)]
    config: Option<String>,
}

#[derive(Args)]
struct AggregateArgs {
    /// City registry, path or URL
    #[arg(long, default_value = "data/cities.json")]
    cities: String,

    /// Minimum wage table, path or URL
    #[arg(long, default_value = "data/minimum_wages.json")]
    wages: String,

    /// Where to write the final dataset
    #[arg(short, long, default_value = "data/cities_final.json")]
    output: String,

    /// Optional: S3 bucket to publish the final dataset to (e.g., "my-bucket")
    #[arg(long)]
    s3_bucket: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/poutine_index.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("poutine_index.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());

    let code = match cli.command {
        Commands::Validate(args) => {
            let report = validate_command(&args, today).await?;
            exit_code(report.is_failure(), false)
        }
        Commands::Aggregate { input, aggregate } => {
            let bytes = load_source(&input).await?;
            let observations =
                parse_observations(&bytes).with_context(|| format!("parsing {}", input))?;
            let aggregated = aggregate_command(&aggregate, &observations, today).await?;
            exit_code(false, !aggregated)
        }
        Commands::Run {
            validate,
            aggregate,
        } => {
            let report = validate_command(&validate, today).await?;
            let aggregated = aggregate_command(&aggregate, &report.kept, today).await?;
            exit_code(report.is_failure(), !aggregated)
        }
    };

    Ok(ExitCode::from(code))
}

/// Maps a run's outcome to the process exit code.
///
/// A skipped aggregation wins over validation failures.
fn exit_code(validation_failed: bool, aggregation_skipped: bool) -> u8 {
    if aggregation_skipped {
        EXIT_NO_DATA
    } else if validation_failed {
        EXIT_INVALID
    } else {
        0
    }
}

/// Validates the raw observations, logs the findings, and writes the snapshot.
#[tracing::instrument(skip_all, fields(raw = %args.raw, strict = args.strict, today = %today))]
async fn validate_command(args: &ValidateArgs, today: NaiveDate) -> Result<ValidationReport> {
    let config = match &args.config {
        Some(path) => ValidationConfig::load(path)?,
        None => ValidationConfig::default(),
    };
    let policy = if args.strict {
        ExclusionPolicy::Strict
    } else {
        ExclusionPolicy::Errors
    };

    let bytes = load_source(&args.raw).await?;
    let observations =
        parse_observations(&bytes).with_context(|| format!("parsing {}", args.raw))?;
    info!(count = observations.len(), "Loaded price observations");

    let report = validate(&observations, today, &config, policy);

    if !args.quiet {
        log_findings(&report.findings);
    }
    info!(
        errors = report.error_count(),
        warnings = report.warning_count(),
        kept = report.kept.len(),
        total = report.total(),
        "Validation complete"
    );

    if let Some(path) = &args.findings_csv {
        append_findings(path, &report.findings)?;
    }

    let snapshot = ValidatedSnapshot {
        validation_date: today.format("%Y-%m-%d").to_string(),
        prices: report.kept.clone(),
    };
    write_json(&args.validated, &snapshot)?;
    info!(path = %args.validated, "Saved validated observations");

    Ok(report)
}

/// Aggregates validated observations and writes (and optionally publishes) the dataset.
///
/// Returns `false` when there was nothing to aggregate.
#[tracing::instrument(skip_all, fields(observations = observations.len(), today = %today))]
async fn aggregate_command(
    args: &AggregateArgs,
    observations: &[RawObservation],
    today: NaiveDate,
) -> Result<bool> {
    if observations.is_empty() {
        warn!("No validated observations, skipping aggregation");
        return Ok(false);
    }

    let registry = parse_registry(&load_source(&args.cities).await?)
        .with_context(|| format!("parsing {}", args.cities))?;
    let wages = parse_wages(&load_source(&args.wages).await?)
        .with_context(|| format!("parsing {}", args.wages))?;
    info!(
        cities = registry.len(),
        provinces = wages.len(),
        observations = observations.len(),
        "Loaded aggregation inputs"
    );

    let outcome = aggregate_cities(&registry, &wages, observations);

    for missing in &outcome.missing_wages {
        warn!(city = %missing.city, province = %missing.province, "Missing minimum wage data");
    }
    if !outcome.unmatched_cities.is_empty() {
        warn!(cities = ?outcome.unmatched_cities, "Observations for cities outside the registry ignored");
    }

    let summary = DatasetSummary::from_cities(&outcome.cities);
    info!(
        cities_with_data = summary.cities_with_data,
        total_cities = summary.total_cities,
        total_samples = summary.total_samples,
        regular_range = ?summary.regular_mean_range,
        affordability_minutes = ?summary.affordability_range,
        "Aggregation summary"
    );

    let dataset = CityDataset::new(today, outcome.cities);
    write_json(&args.output, &dataset)?;
    info!(path = %args.output, "Saved aggregated data");

    if let Some(bucket) = &args.s3_bucket {
        let config = aws_config::load_from_env().await;
        let s3 = aws_sdk_s3::Client::new(&config);
        publish_dataset(&s3, bucket, DATASET_KEY, &dataset).await?;
    }

    Ok(true)
}
