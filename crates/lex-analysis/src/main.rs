//! CLI entry point for data quality and drift analysis.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use lex_analysis::reporting::{
    DatasetSummary, DriftReportRecord, QualityReportRecord, ReportGenerator, report_base_name,
};
use lex_analysis::types::{DriftOutcome, DriftReport, DriftTest, DriftTestResults, QualityAnalysis};
use lex_analysis::{AnalysisConfig, DataQualityChecker, DriftDetector, load_csv};
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "Data quality and distribution drift analysis",
    long_about = "Checks a tabular dataset for quality issues, or compares two datasets for \
                  distribution drift column by column.\n\n\
                  EXAMPLES:\n  \
                  # Quality report for one dataset\n  \
                  lex-analysis quality data.csv\n\n  \
                  # Drift between a reference and a target dataset\n  \
                  lex-analysis drift train.csv live.csv --threshold 0.01\n\n  \
                  # Machine-readable output\n  \
                  lex-analysis drift train.csv live.csv --json | jq .drift_detected"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output directory for reports
    #[arg(short, long, default_value = "./outputs", global = true)]
    output: PathBuf,

    /// JSON file with analysis settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all logs; only outputs the final JSON report.
    #[arg(long, global = true)]
    json: bool,

    /// Write the JSON report to the output directory (also with --json)
    #[arg(short = 'r', long, global = true)]
    emit_report: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the data quality checks on one CSV file
    Quality {
        /// Path to the CSV file to analyze
        input: PathBuf,
    },
    /// Compare a target CSV file against a reference CSV file
    Drift {
        /// Reference (baseline) dataset
        reference: PathBuf,
        /// Target (current) dataset
        target: PathBuf,
        /// Significance threshold for the per-column tests
        #[arg(short, long)]
        threshold: Option<f64>,
    },
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
    // .env may carry RUST_LOG, so load it before the subscriber
    dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    match &args.command {
        Command::Quality { input } => run_quality(&args, input),
        Command::Drift {
            reference,
            target,
            threshold,
        } => run_drift(&args, reference, target, *threshold),
    }
}

/// Load settings from `--config`, falling back to defaults.
fn load_config(path: Option<&Path>, threshold: Option<f64>) -> Result<AnalysisConfig> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str::<AnalysisConfig>(&content)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };

    if let Some(threshold) = threshold {
        config.drift_threshold = threshold;
    }
    config.validate()?;
    Ok(config)
}

fn load_dataset(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(anyhow!("Input file not found: {}", path.display()));
    }

    info!("Loading dataset from: {}", path.display());
    let df = load_csv(path)?;
    info!("Dataset loaded successfully: {:?}", df.shape());
    Ok(df)
}

fn run_quality(args: &Args, input: &Path) -> Result<()> {
    let config = load_config(args.config.as_deref(), None)?;
    let df = load_dataset(input)?;

    let checker = DataQualityChecker::new(config);
    let summary = DatasetSummary::from_dataset(input, &df, &checker);

    info!("Running quality checks on {} columns", summary.columns);
    let record = QualityReportRecord::new(report_base_name(input), checker.check_all(&df));

    if args.emit_report {
        let generator = ReportGenerator::new(args.output.clone());
        generator.write_quality_report(&record, &report_base_name(input))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    print_quality_summary(&summary, &record.analysis);
    Ok(())
}

fn run_drift(args: &Args, reference: &Path, target: &Path, threshold: Option<f64>) -> Result<()> {
    let config = load_config(args.config.as_deref(), threshold)?;
    let reference_df = load_dataset(reference)?;
    let target_df = load_dataset(target)?;

    let detector = DriftDetector::new(config);
    info!("Running drift detection (threshold {})", detector.threshold());
    let record = DriftReportRecord::new(
        report_base_name(reference),
        report_base_name(target),
        detector.detect_drift(&reference_df, &target_df),
    );

    if args.emit_report {
        let base_name = format!(
            "{}_vs_{}",
            record.reference_dataset_id, record.target_dataset_id
        );
        ReportGenerator::new(args.output.clone()).write_drift_report(&record, &base_name)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    print_drift_summary(reference, target, &record.report);
    Ok(())
}

/// Print the human-readable quality summary.
///
/// Uses `println!` so the summary is visible regardless of log level.
fn print_quality_summary(summary: &DatasetSummary, analysis: &QualityAnalysis) {
    println!("\n{}", "=".repeat(80));
    println!("DATA QUALITY REPORT");
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", summary.filename);
    println!("  Dataset ID: {}", summary.id);
    println!("  Loaded: {}", summary.upload_date.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Rows: {}", summary.rows);
    println!("  Columns: {}", summary.columns);
    println!("  Size: {} bytes", summary.file_size);
    println!();

    println!("COLUMNS");
    println!("{}", "-".repeat(40));
    println!(
        "{:<20} {:<10} {:<10} {:<10}",
        "Column", "Type", "Missing", "Missing %"
    );
    println!("{}", "-".repeat(70));
    for name in &summary.column_names {
        let label = analysis
            .data_types
            .get(name)
            .map(|t| t.to_string())
            .unwrap_or_else(|| "?".to_string());
        let missing = analysis.missing_values.columns.get(name);
        println!(
            "{:<20} {:<10} {:<10} {:<10.2}",
            truncate_str(name, 19),
            label,
            missing.map(|m| m.count).unwrap_or(0),
            missing.map(|m| m.percentage).unwrap_or(0.0)
        );
    }
    println!();

    println!("DUPLICATES");
    println!("{}", "-".repeat(40));
    let duplicates = &analysis.duplicates;
    if let Some(err) = &duplicates.error {
        println!("  Check failed: {}", err);
    } else {
        println!(
            "  {} of {} rows duplicated ({:.2}%)",
            duplicates.duplicate_count, duplicates.total_rows, duplicates.duplicate_percentage
        );
    }
    println!();

    println!("OUTLIERS (IQR)");
    println!("{}", "-".repeat(40));
    let mut outlier_columns: Vec<_> = analysis.outliers.iter().collect();
    outlier_columns.sort_by(|a, b| a.0.cmp(b.0));
    if outlier_columns.iter().all(|(_, info)| info.count == 0) {
        println!("  No outliers detected");
    }
    for (name, info) in outlier_columns.iter().filter(|(_, info)| info.count > 0) {
        println!(
            "  - {}: {} values ({:.2}%) outside [{:.4}, {:.4}]",
            name, info.count, info.percentage, info.lower_bound, info.upper_bound
        );
    }

    println!("{}", "=".repeat(80));
}

/// Print the human-readable drift summary.
fn print_drift_summary(reference: &Path, target: &Path, report: &DriftReport) {
    println!("\n{}", "=".repeat(80));
    println!("DRIFT REPORT");
    println!("{}\n", "=".repeat(80));

    println!("  Reference: {}", reference.display());
    println!("  Target:    {}", target.display());
    println!();

    let summary = match &report.test_results {
        DriftTestResults::Summary(summary) => summary,
        DriftTestResults::Failed { error } => {
            println!("  Drift detection failed: {}", error);
            println!("{}", "=".repeat(80));
            return;
        }
    };

    println!(
        "{:<20} {:<16} {:<10} {:<10} {:<10}",
        "Column", "Test", "Score", "p-value", "Drift"
    );
    println!("{}", "-".repeat(70));

    let mut columns: Vec<_> = report.column_drift.values().collect();
    columns.sort_by(|a, b| a.column_name.cmp(&b.column_name));
    for column in columns {
        let test = match column.test_type {
            DriftTest::KolmogorovSmirnov => "KS",
            DriftTest::ChiSquare => "Chi-Square",
        };
        let p_value = column
            .p_value()
            .map(|p| format!("{:.4}", p))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<20} {:<16} {:<10.4} {:<10} {:<10}",
            truncate_str(&column.column_name, 19),
            test,
            column.drift_score,
            p_value,
            if column.has_drift { "yes" } else { "no" }
        );
        match &column.outcome {
            DriftOutcome::Numeric(stats) => println!("    PSI: {:.4}", stats.psi_score),
            DriftOutcome::Failed { error } => println!("    error: {}", error),
            DriftOutcome::Categorical(_) => {}
        }
    }
    println!();

    println!("SUMMARY");
    println!("{}", "-".repeat(40));
    println!("  Columns tested: {}", summary.total_columns_tested);
    println!("  Columns with drift: {}", summary.columns_with_drift);
    println!("  Threshold: {}", summary.threshold);
    println!("  Overall drift score: {:.4}", report.overall_drift_score);
    println!(
        "  Drift detected: {}",
        if report.drift_detected { "YES" } else { "no" }
    );
    println!("{}", "=".repeat(80));
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
