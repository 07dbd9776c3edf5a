//! Sequential ingestion loops — one per mode.
//!
//! Per run: for each configured item, wait out the throttle, fetch,
//! normalize, and accumulate rows; then merge the batch into the store in
//! one operation. Per-item failures are tagged outcomes that route back
//! into the loop — only store-level errors abort a run.
//!
//! Items are processed strictly one at a time, in configured order. The
//! source penalizes concurrent querying, so nothing here is parallel on
//! purpose.

use crate::config::TrackerConfig;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use trendtrack_core::client::provider::{SignalError, SignalProvider};
use trendtrack_core::client::throttle::Throttle;
use trendtrack_core::domain::{InterestRow, MergeRow, TrendRow};
use trendtrack_core::normalize;
use trendtrack_core::store::{CsvStore, MergePolicy, StoreError};

/// Errors that abort a run. Everything per-item is an [`ItemOutcome`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What happened to one configured item.
#[derive(Debug)]
pub enum ItemOutcome {
    /// The item contributed this many rows to the batch.
    Collected { rows: usize },
    /// The item contributed nothing; the run continues.
    Skipped { reason: SignalError },
}

/// Progress callback for a run.
pub trait RunProgress: Send {
    /// Called before fetching an item.
    fn on_start(&self, term: &str, index: usize, total: usize);

    /// Called once per item with its outcome.
    fn on_item(&self, term: &str, index: usize, total: usize, outcome: &ItemOutcome);

    /// Called after the merge step (or the empty-batch no-op).
    fn on_finish(&self, summary: &RunSummary);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl RunProgress for StdoutProgress {
    fn on_start(&self, term: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {term}...", index + 1, total);
    }

    fn on_item(&self, term: &str, _index: usize, _total: usize, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Collected { rows } => println!("  OK: {term} ({rows} row(s))"),
            ItemOutcome::Skipped { reason } => println!("  SKIP: {term}: {reason}"),
        }
    }

    fn on_finish(&self, summary: &RunSummary) {
        if summary.wrote_store {
            println!(
                "\nRun complete: {}/{} items collected, {} new row(s), store now {} row(s)",
                summary.collected, summary.total, summary.new_rows, summary.store_rows
            );
        } else {
            println!("\nNo data collected — store left untouched.");
        }
    }
}

/// Summary of one ingestion run.
#[derive(Debug)]
pub struct RunSummary {
    /// Items configured for this run.
    pub total: usize,
    /// Items that contributed at least one row.
    pub collected: usize,
    /// Items skipped, with the reason for each.
    pub skipped: Vec<(String, SignalError)>,
    /// Rows in this run's batch.
    pub new_rows: usize,
    /// Rows in the store after the merge (0 when the store was untouched).
    pub store_rows: usize,
    /// Whether the store file was rewritten.
    pub wrote_store: bool,
}

impl RunSummary {
    pub fn all_collected(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Scoring mode: one mean daily interest row per configured keyword,
/// merged under keep-last.
pub fn run_scoring(
    provider: &dyn SignalProvider,
    throttle: &Throttle,
    cfg: &TrackerConfig,
    store: &CsvStore<InterestRow>,
    run_date: NaiveDate,
    progress: &dyn RunProgress,
) -> Result<RunSummary, PipelineError> {
    let total = cfg.scoring.keywords.len();
    let mut batch: Vec<InterestRow> = Vec::new();
    let mut collected = 0;
    let mut skipped: Vec<(String, SignalError)> = Vec::new();

    for (i, keyword) in cfg.scoring.keywords.iter().enumerate() {
        progress.on_start(keyword, i, total);
        throttle.wait();

        let outcome = match provider.interest_over_time(keyword, cfg.query.window, &cfg.query.geo)
        {
            Ok(series) => match normalize::daily_interest(keyword, &series, run_date) {
                Some(row) => {
                    batch.push(row);
                    ItemOutcome::Collected { rows: 1 }
                }
                None => ItemOutcome::Skipped {
                    reason: SignalError::NoData {
                        term: keyword.clone(),
                    },
                },
            },
            Err(e) => ItemOutcome::Skipped { reason: e },
        };

        progress.on_item(keyword, i, total, &outcome);
        match outcome {
            ItemOutcome::Collected { .. } => collected += 1,
            ItemOutcome::Skipped { reason } => skipped.push((keyword.clone(), reason)),
        }
    }

    finish(
        store,
        batch,
        MergePolicy::KeepLast,
        total,
        collected,
        skipped,
        progress,
    )
}

/// Discovery mode: rising related queries per seed term, merged under
/// keep-highest-score.
pub fn run_discovery(
    provider: &dyn SignalProvider,
    throttle: &Throttle,
    cfg: &TrackerConfig,
    store: &CsvStore<TrendRow>,
    run_date: NaiveDate,
    progress: &dyn RunProgress,
) -> Result<RunSummary, PipelineError> {
    let total = cfg.discovery.seed_terms.len();
    let mut batch: Vec<TrendRow> = Vec::new();
    let mut collected = 0;
    let mut skipped: Vec<(String, SignalError)> = Vec::new();

    for (i, seed) in cfg.discovery.seed_terms.iter().enumerate() {
        progress.on_start(seed, i, total);
        throttle.wait();

        let outcome = match provider.rising_queries(seed, cfg.query.window, &cfg.query.geo) {
            Ok(queries) => {
                let rows = normalize::rising_trends(seed, &queries, run_date);
                if rows.is_empty() {
                    ItemOutcome::Skipped {
                        reason: SignalError::NoData { term: seed.clone() },
                    }
                } else {
                    let count = rows.len();
                    batch.extend(rows);
                    ItemOutcome::Collected { rows: count }
                }
            }
            Err(e) => ItemOutcome::Skipped { reason: e },
        };

        progress.on_item(seed, i, total, &outcome);
        match outcome {
            ItemOutcome::Collected { .. } => collected += 1,
            ItemOutcome::Skipped { reason } => skipped.push((seed.clone(), reason)),
        }
    }

    finish(
        store,
        batch,
        MergePolicy::KeepHighestScore,
        total,
        collected,
        skipped,
        progress,
    )
}

/// Merge the batch into the store (or no-op on an empty batch) and build
/// the summary.
fn finish<R: MergeRow + Serialize + DeserializeOwned>(
    store: &CsvStore<R>,
    batch: Vec<R>,
    policy: MergePolicy,
    total: usize,
    collected: usize,
    skipped: Vec<(String, SignalError)>,
    progress: &dyn RunProgress,
) -> Result<RunSummary, PipelineError> {
    let new_rows = batch.len();
    let wrote_store = !batch.is_empty();

    // An empty batch never touches the store — not even to read it.
    let store_rows = if wrote_store {
        store.merge_and_persist(batch, policy)?.len()
    } else {
        0
    };

    let summary = RunSummary {
        total,
        collected,
        skipped,
        new_rows,
        store_rows,
        wrote_store,
    };
    progress.on_finish(&summary);
    Ok(summary)
}
