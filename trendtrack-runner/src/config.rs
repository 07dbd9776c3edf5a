//! Tracker configuration — TOML file with compiled-in defaults.
//!
//! Every field defaults to the tracker's built-in constants, so a missing
//! file or an empty TOML string is a valid configuration. The defaults
//! track a small set of fragrance keywords in the US over the last 24
//! hours.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use trendtrack_core::client::ClientOptions;
use trendtrack_core::Window;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {detail}")]
    Read { path: String, detail: String },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Query parameters shared by both modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Region code, e.g. `US`.
    pub geo: String,
    /// Lookback window requested from the source.
    pub window: Window,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            geo: "US".into(),
            window: Window::Last24h,
        }
    }
}

/// Scoring mode: fixed keywords, one daily score each.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub keywords: Vec<String>,
    pub output: PathBuf,
    /// Minimum delay between fetches, in milliseconds. Zero = no throttle;
    /// raise this for keyword lists beyond a handful of items.
    pub throttle_ms: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            keywords: vec![
                "Vanilla Perfume".into(),
                "Oud".into(),
                "Santal 33".into(),
                "Cherry Perfume".into(),
            ],
            output: PathBuf::from("trends.csv"),
            throttle_ms: 0,
        }
    }
}

/// Discovery mode: broad seed terms, rising related queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub seed_terms: Vec<String>,
    pub output: PathBuf,
    /// Minimum delay between fetches, in milliseconds.
    pub throttle_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            seed_terms: vec!["perfume".into(), "fragrance".into(), "cologne".into()],
            output: PathBuf::from("rising_trends.csv"),
            throttle_ms: 2000,
        }
    }
}

/// The full tracker configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub client: ClientOptions,
    pub query: QueryConfig,
    pub scoring: ScoringConfig,
    pub discovery: DiscoveryConfig,
}

impl TrackerConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}
