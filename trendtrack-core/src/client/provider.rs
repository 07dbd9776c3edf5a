//! Signal provider trait and structured error types.
//!
//! The SignalProvider trait abstracts over the search-interest source so the
//! pipeline can swap implementations and mock for tests. Providers do not
//! retry and do not throttle — both are the caller's responsibility.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lookback window requested from the source.
///
/// Maps to the source's timeframe tokens (see [`Window::timeframe`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Window {
    #[serde(rename = "last_24h")]
    Last24h,
    #[serde(rename = "last_7d")]
    Last7d,
    #[serde(rename = "last_30d")]
    Last30d,
    #[serde(rename = "last_90d")]
    Last90d,
    #[serde(rename = "last_12m")]
    Last12m,
}

impl Window {
    /// The timeframe token the source expects in query payloads.
    pub fn timeframe(&self) -> &'static str {
        match self {
            Window::Last24h => "now 1-d",
            Window::Last7d => "now 7-d",
            Window::Last30d => "today 1-m",
            Window::Last90d => "today 3-m",
            Window::Last12m => "today 12-m",
        }
    }
}

/// One point of an interest-over-time series.
#[derive(Debug, Clone, PartialEq)]
pub struct InterestPoint {
    /// Unix timestamp of the point, as reported by the source.
    pub time: i64,
    /// Interest value on the source's 0–100 scale.
    pub value: f64,
}

/// Interest-over-time series for a single term over one query window.
///
/// Transient — never persisted; the normalizer collapses it to one row.
#[derive(Debug, Clone, PartialEq)]
pub struct InterestSeries {
    pub term: String,
    pub points: Vec<InterestPoint>,
}

impl InterestSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Growth magnitude of a rising related query.
///
/// The source reports either a finite growth percentage or a non-numeric
/// marker for growth too large to express as a ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Magnitude {
    Finite(f64),
    Breakout,
}

/// One rising related query for a seed term.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedQuery {
    pub query: String,
    pub magnitude: Magnitude,
}

/// Structured error types for signal fetches.
///
/// All variants are recoverable at the pipeline level: a failed term is
/// skipped and the run continues.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by source (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("requests blocked by source (HTTP 403)")]
    Blocked,

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("no data for term '{term}' in the requested window")]
    NoData { term: String },

    #[error("signal error: {0}")]
    Other(String),
}

/// Trait for search-interest providers.
///
/// Implementations handle the specifics of one external source. Rate
/// limiting sits above this trait — providers don't know about the throttle.
pub trait SignalProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the interest-over-time series for a term.
    ///
    /// An empty series is a valid result (the term had no volume in the
    /// window); `NoData` is reserved for responses with no series at all.
    fn interest_over_time(
        &self,
        term: &str,
        window: Window,
        geo: &str,
    ) -> Result<InterestSeries, SignalError>;

    /// Fetch the rising related queries for a seed term.
    ///
    /// A seed with no rising queries yields an empty vec, not an error.
    fn rising_queries(
        &self,
        term: &str,
        window: Window,
        geo: &str,
    ) -> Result<Vec<RelatedQuery>, SignalError>;
}
