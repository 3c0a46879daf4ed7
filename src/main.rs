//! CLI entry point for the district report tool.
//!
//! Provides subcommands for printing the full report, exporting every table
//! to a directory, and checking the input tables for consistency.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use district_report::analyzers::aggregate::{school_summaries, size_mismatches};
use district_report::analyzers::bins::bin_index;
use district_report::join::summarize;
use district_report::{ReportConfig, build_report, load_joined, output};
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "district_report")]
#[command(about = "Summarize school and student performance data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Inputs {
    /// CSV file with one row per school
    #[arg(long, env = "SCHOOLS_CSV", value_name = "CSV")]
    schools: String,

    /// CSV file with one row per student
    #[arg(long, env = "STUDENTS_CSV", value_name = "CSV")]
    students: String,

    /// Optional JSON report configuration (thresholds, bins, weighting)
    #[arg(short, long, env = "REPORT_CONFIG")]
    config: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every report table to stdout
    Report {
        #[command(flatten)]
        inputs: Inputs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Write every report table as CSV, plus report.json, into a directory
    Export {
        #[command(flatten)]
        inputs: Inputs,

        /// Directory to write the tables to
        #[arg(short = 'd', long, default_value = "report")]
        output_dir: PathBuf,
    },
    /// Load and join the tables and report data-quality problems
    Validate {
        #[command(flatten)]
        inputs: Inputs,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/district_report.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("district_report.log"));

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

    match cli.command {
        Commands::Report { inputs, format } => {
            let config = load_config(inputs.config.as_deref())?;
            let rows = load_joined(&inputs.schools, &inputs.students)?;
            let report = build_report(&rows, &config)?;
            output::print_pretty(&report);

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            match format {
                Format::Text => output::write_text(&mut out, &report)?,
                Format::Json => output::write_json(&mut out, &report)?,
                Format::Csv => output::write_all_csv(&mut out, &report)?,
            }
            out.flush()?;
        }
        Commands::Export { inputs, output_dir } => {
            let config = load_config(inputs.config.as_deref())?;
            let rows = load_joined(&inputs.schools, &inputs.students)?;
            let report = build_report(&rows, &config)?;

            let written = output::export_tables(&output_dir, &report)
                .with_context(|| format!("exporting to {}", output_dir.display()))?;
            for path in &written {
                info!(path = %path.display(), "Written");
            }
        }
        Commands::Validate { inputs } => {
            let config = load_config(inputs.config.as_deref())?;
            validate(&inputs, &config)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<ReportConfig> {
    match path {
        Some(path) => {
            ReportConfig::load(path).with_context(|| format!("loading config {path}"))
        }
        None => Ok(ReportConfig::default()),
    }
}

/// Loads and joins both tables, runs the per-school consistency checks and
/// logs a data-quality summary.
#[tracing::instrument(skip_all, fields(schools = %inputs.schools, students = %inputs.students))]
fn validate(inputs: &Inputs, config: &ReportConfig) -> Result<()> {
    let rows = load_joined(&inputs.schools, &inputs.students)?;
    let schools = school_summaries(&rows, config.passing_score)?;
    let join = summarize(&rows);
    let mismatches = size_mismatches(&rows);

    let unbinned_spending = schools
        .iter()
        .filter(|s| {
            s.per_student_budget
                .is_none_or(|v| bin_index(&config.spending_bins, v).is_none())
        })
        .count();
    let unbinned_size = schools
        .iter()
        .filter(|s| bin_index(&config.size_bins, s.total_students as f64).is_none())
        .count();

    for school in &join.unknown_schools {
        warn!(school = %school, "Students reference a school missing from the school table");
    }

    info!(
        students = join.students,
        matched = join.matched,
        unmatched = join.unmatched,
        schools = schools.len(),
        size_mismatches = mismatches.len(),
        unbinned_spending,
        unbinned_size,
        "Validation summary"
    );

    Ok(())
}
