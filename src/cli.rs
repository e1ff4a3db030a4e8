//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::parquet_report::ParquetReportAdapter;
use crate::domain::backtest::{run_backtest, BacktestConfig, BacktestResult};
use crate::domain::config_validation::build_backtest_config;
use crate::domain::error::BacktestError;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const PLACEHOLDER_MESSAGE: &str = "Backtest placeholder";

const DEFAULT_LOG_FILTER: &str = "oco_backtest=info";

#[derive(Parser, Debug)]
#[command(name = "oco-backtest", about = "Backtest post-triggered OCO entries against book data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reserved backtest entry point; prints a placeholder and exits
    Backtest,
    /// Align posts with the book and write the result table
    Run {
        /// Posts CSV with a `timestamp` column
        #[arg(long)]
        posts: PathBuf,
        /// Book CSV with `timestamp` and `price` columns
        #[arg(long)]
        book: PathBuf,
        /// Post observation latency in milliseconds; overrides the config file
        #[arg(long = "latency_ms", allow_negative_numbers = true)]
        latency_ms: Option<i64>,
        /// INI or JSON config file
        #[arg(long)]
        config: PathBuf,
        /// Output path; `.csv` writes CSV, anything else Parquet
        #[arg(long)]
        out: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show row counts and time ranges of the inputs
    Info {
        #[arg(long)]
        posts: PathBuf,
        #[arg(long)]
        book: PathBuf,
    },
}

/// Install the stderr subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest => run_placeholder(),
        Command::Run {
            posts,
            book,
            latency_ms,
            config,
            out,
        } => run_alignment(&posts, &book, latency_ms, &config, &out),
        Command::Validate { config } => run_validate(&config),
        Command::Info { posts, book } => run_info(&posts, &book),
    }
}

fn run_placeholder() -> ExitCode {
    println!("{PLACEHOLDER_MESSAGE}");
    ExitCode::SUCCESS
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, BacktestError> {
    FileConfigAdapter::from_file(path).map_err(|e| BacktestError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Pick the report writer from the output extension.
pub fn report_for_path(path: &Path) -> Box<dyn ReportPort> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        Box::new(CsvReportAdapter)
    } else {
        Box::new(ParquetReportAdapter::new())
    }
}

fn run_alignment(
    posts_path: &Path,
    book_path: &Path,
    latency_override: Option<i64>,
    config_path: &Path,
    out_path: &Path,
) -> ExitCode {
    // Stage 1: Load and validate config
    info!("loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let bt_config = match build_backtest_config(&adapter, latency_override) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let show_summary = adapter.get_bool("report", "summary", true);

    // Stages 2-4: Read, align, write
    let data_port = CsvAdapter::new(posts_path.to_path_buf(), book_path.to_path_buf());
    let report = report_for_path(out_path);

    match run_pipeline(&data_port, report.as_ref(), &bt_config, out_path) {
        Ok(result) => {
            if show_summary {
                print_summary(&result, &bt_config);
            }
            eprintln!("\nResult written to: {}", out_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Read both inputs, run the alignment and write the result table.
pub fn run_pipeline(
    data_port: &dyn DataPort,
    report: &dyn ReportPort,
    bt_config: &BacktestConfig,
    out_path: &Path,
) -> Result<BacktestResult, BacktestError> {
    // Stage 2: Fetch inputs
    let posts = data_port.fetch_posts()?;
    if posts.is_empty() {
        warn!("no posts found; every post_count will be 0");
    }
    let book = data_port.fetch_book()?;
    if book.is_empty() {
        warn!("book has no rows; writing an empty table");
    }
    info!(posts = posts.len(), book_rows = book.len(), "inputs loaded");

    // Stage 3: Align and join
    debug!(
        latency_ms = bt_config.latency.num_milliseconds(),
        baseline_secs = bt_config.windows.baseline.num_seconds(),
        volatility_secs = bt_config.windows.volatility.num_seconds(),
        "running alignment"
    );
    let result = run_backtest(&posts, book, bt_config);
    if result.posts_unmatched() > 0 {
        warn!(
            unmatched = result.posts_unmatched(),
            "posts fell in seconds without book rows and were dropped"
        );
    }

    // Stage 4: Write report
    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    report.write(&result, out_path)?;
    info!(rows = result.rows.len(), "result written");

    Ok(result)
}

fn print_summary(result: &BacktestResult, bt_config: &BacktestConfig) {
    eprintln!("\n=== Alignment Summary ===");
    eprintln!("Book Rows:        {}", result.rows.len());
    eprintln!("Posts:            {}", result.posts_total);
    eprintln!("Posts Matched:    {}", result.posts_matched);
    eprintln!("Rows With Posts:  {}", result.rows_with_posts());
    eprintln!("Latency:          {} ms", bt_config.latency.num_milliseconds());
    eprintln!("Max Stdev:        {:.2} bp", result.max_stdev_bp());
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let bt_config = match build_backtest_config(&adapter, None) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let sections = adapter.sections();
    if !sections.is_empty() {
        eprintln!("\nSections: {}", sections.join(", "));
    }
    eprintln!("\nEffective settings:");
    eprintln!("  latency_ms:             {}", bt_config.latency.num_milliseconds());
    eprintln!(
        "  baseline_window_secs:   {}",
        bt_config.windows.baseline.num_seconds()
    );
    eprintln!(
        "  volatility_window_secs: {}",
        bt_config.windows.volatility.num_seconds()
    );

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_info(posts_path: &Path, book_path: &Path) -> ExitCode {
    let data_port = CsvAdapter::new(posts_path.to_path_buf(), book_path.to_path_buf());
    match describe_inputs(&data_port) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// One line per input: row count and time range.
pub fn describe_inputs(data_port: &dyn DataPort) -> Result<Vec<String>, BacktestError> {
    let posts = data_port.fetch_posts()?;
    let book = data_port.fetch_book()?;

    let posts_line = match (
        posts.iter().map(|p| p.timestamp).min(),
        posts.iter().map(|p| p.timestamp).max(),
    ) {
        (Some(first), Some(last)) => {
            format!("posts: {} rows, {} to {}", posts.len(), first, last)
        }
        _ => "posts: no rows".to_string(),
    };
    let book_line = match book.time_range() {
        Some((first, last)) => format!("book: {} rows, {} to {}", book.len(), first, last),
        None => "book: no rows".to_string(),
    };

    Ok(vec![posts_line, book_line])
}
