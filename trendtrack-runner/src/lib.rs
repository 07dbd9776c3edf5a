//! TrendTrack Runner — ingestion orchestration on top of `trendtrack-core`.
//!
//! This crate provides:
//! - TOML configuration with the tracker's compiled-in defaults
//! - The sequential per-item ingestion loops for both modes
//! - Progress reporting and run summaries

pub mod config;
pub mod pipeline;

pub use config::{ConfigError, DiscoveryConfig, QueryConfig, ScoringConfig, TrackerConfig};
pub use pipeline::{
    run_discovery, run_scoring, ItemOutcome, PipelineError, RunProgress, RunSummary,
    StdoutProgress,
};
