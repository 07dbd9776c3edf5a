//! Persisted row types and their merge identity.
//!
//! Field order matters: the CSV store derives its header and column order
//! from struct declaration order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily interest score for a tracked keyword.
///
/// Columns: `date,keyword,interest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestRow {
    pub date: NaiveDate,
    pub keyword: String,
    pub interest: f64,
}

/// One rising related query discovered from a seed term.
///
/// Columns: `trend_name,growth_score,seed_term,date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRow {
    pub trend_name: String,
    pub growth_score: f64,
    pub seed_term: String,
    pub date: NaiveDate,
}

/// Merge identity for persisted rows.
///
/// A store never holds two rows with the same `(date, key)` after a merge
/// cycle; `score` is what the keep-highest policy compares.
pub trait MergeRow {
    /// CSV column names, in field order. The store rejects files whose
    /// header doesn't match.
    const COLUMNS: &'static [&'static str];

    fn date(&self) -> NaiveDate;
    fn key(&self) -> &str;
    fn score(&self) -> f64;
}

impl MergeRow for InterestRow {
    const COLUMNS: &'static [&'static str] = &["date", "keyword", "interest"];

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn key(&self) -> &str {
        &self.keyword
    }

    fn score(&self) -> f64 {
        self.interest
    }
}

impl MergeRow for TrendRow {
    const COLUMNS: &'static [&'static str] = &["trend_name", "growth_score", "seed_term", "date"];

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn key(&self) -> &str {
        &self.trend_name
    }

    fn score(&self) -> f64 {
        self.growth_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interest_row_merge_identity() {
        let row = InterestRow {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            keyword: "Oud".into(),
            interest: 42.5,
        };
        assert_eq!(row.key(), "Oud");
        assert_eq!(row.date(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(row.score(), 42.5);
    }

    #[test]
    fn trend_row_keys_on_trend_name_not_seed() {
        let row = TrendRow {
            trend_name: "santal 33 dupe".into(),
            growth_score: 250.0,
            seed_term: "perfume".into(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        assert_eq!(row.key(), "santal 33 dupe");
        assert_eq!(row.score(), 250.0);
    }
}
