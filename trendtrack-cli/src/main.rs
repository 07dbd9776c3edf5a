//! TrendTrack CLI — search-interest ingestion commands.
//!
//! Commands:
//! - `score` — fetch one daily interest score per configured keyword
//! - `discover` — fetch rising related queries for the configured seed terms
//! - `status` — report both stores (rows, date range, size)
//!
//! Per-item fetch failures are printed and skipped; they never fail the
//! process. Only fatal errors (unreadable config, corrupt or unwritable
//! store) produce a non-zero exit.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use trendtrack_core::domain::MergeRow;
use trendtrack_core::{CsvStore, GoogleTrendsClient, InterestRow, Throttle, TrendRow};
use trendtrack_runner::{run_discovery, run_scoring, StdoutProgress, TrackerConfig};

#[derive(Parser)]
#[command(
    name = "trendtrack",
    about = "TrendTrack CLI — search-interest tracking over Google Trends"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score the configured keywords and merge into the scoring store.
    Score {
        /// Path to a TOML config file. Defaults to the built-in configuration.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Run date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
    /// Discover rising related queries for the configured seed terms.
    Discover {
        /// Path to a TOML config file. Defaults to the built-in configuration.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Run date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
    /// Report both stores: row counts, date ranges, file sizes.
    Status {
        /// Path to a TOML config file. Defaults to the built-in configuration.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Score { config, date } => run_score(config, date),
        Commands::Discover { config, date } => run_discover(config, date),
        Commands::Status { config } => run_status(config),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<TrackerConfig> {
    match path {
        Some(p) => TrackerConfig::from_file(&p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(TrackerConfig::default()),
    }
}

fn parse_run_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid run date '{s}' (expected YYYY-MM-DD)")),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn run_score(config: Option<PathBuf>, date: Option<String>) -> Result<()> {
    let cfg = load_config(config)?;
    let run_date = parse_run_date(date.as_deref())?;

    println!("Fetching Google Trends data...");
    let provider = GoogleTrendsClient::new(cfg.client.clone());
    let throttle = Throttle::new(Duration::from_millis(cfg.scoring.throttle_ms));
    let store: CsvStore<InterestRow> = CsvStore::new(&cfg.scoring.output);

    run_scoring(&provider, &throttle, &cfg, &store, run_date, &StdoutProgress)?;
    Ok(())
}

fn run_discover(config: Option<PathBuf>, date: Option<String>) -> Result<()> {
    let cfg = load_config(config)?;
    let run_date = parse_run_date(date.as_deref())?;

    println!("Fetching rising queries from Google Trends...");
    let provider = GoogleTrendsClient::new(cfg.client.clone());
    let throttle = Throttle::new(Duration::from_millis(cfg.discovery.throttle_ms));
    let store: CsvStore<TrendRow> = CsvStore::new(&cfg.discovery.output);

    run_discovery(&provider, &throttle, &cfg, &store, run_date, &StdoutProgress)?;
    Ok(())
}

fn run_status(config: Option<PathBuf>) -> Result<()> {
    let cfg = load_config(config)?;

    print_store_status("Scoring store", &CsvStore::<InterestRow>::new(&cfg.scoring.output))?;
    println!();
    print_store_status(
        "Discovery store",
        &CsvStore::<TrendRow>::new(&cfg.discovery.output),
    )?;

    Ok(())
}

fn print_store_status<R: MergeRow + Serialize + DeserializeOwned>(
    label: &str,
    store: &CsvStore<R>,
) -> Result<()> {
    println!("{label}: {}", store.path().display());

    if !store.exists() {
        println!("  (no store yet)");
        return Ok(());
    }

    let size = std::fs::metadata(store.path())
        .with_context(|| format!("failed to stat {}", store.path().display()))?
        .len();

    match store.meta() {
        Some(meta) => {
            println!("  Rows:       {}", meta.row_count);
            match (meta.start_date, meta.end_date) {
                (Some(start), Some(end)) => println!("  Date range: {start} to {end}"),
                _ => println!("  Date range: (empty)"),
            }
        }
        // No sidecar (e.g. hand-migrated file) — count rows directly.
        None => match store.load() {
            Ok(rows) => println!("  Rows:       {}", rows.len()),
            Err(e) => println!("  Rows:       (unreadable: {e})"),
        },
    }

    println!("  Size:       {}", format_size(size));
    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
