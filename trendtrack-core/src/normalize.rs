//! Raw-result normalization into canonical rows.
//!
//! Scoring collapses a per-term time series to a single daily figure (mean
//! over the window, 2 decimal places). Discovery maps each rising related
//! query to a row, substituting the source's breakout marker with a fixed
//! large score so downstream sorting ranks it above every finite magnitude.
//! Rows are dated to the run's execution date, not the data's own
//! timestamps.

use crate::client::provider::{InterestSeries, Magnitude, RelatedQuery};
use crate::domain::{InterestRow, TrendRow};
use chrono::NaiveDate;

/// Score substituted for the unbounded-growth marker.
///
/// Chosen to sort above any finite growth percentage the source reports
/// without inventing false precision.
pub const BREAKOUT_SCORE: f64 = 5000.0;

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Collapse an interest series to one scoring row dated to `run_date`.
///
/// An empty series yields no row — the term simply contributes nothing to
/// this run.
pub fn daily_interest(
    keyword: &str,
    series: &InterestSeries,
    run_date: NaiveDate,
) -> Option<InterestRow> {
    if series.is_empty() {
        return None;
    }

    let sum: f64 = series.points.iter().map(|p| p.value).sum();
    let mean = sum / series.points.len() as f64;

    Some(InterestRow {
        date: run_date,
        keyword: keyword.to_string(),
        interest: round2(mean),
    })
}

/// Map a seed term's rising queries to trend rows dated to `run_date`.
///
/// The breakout marker becomes [`BREAKOUT_SCORE`]; no sentinel survives
/// past this point.
pub fn rising_trends(seed: &str, queries: &[RelatedQuery], run_date: NaiveDate) -> Vec<TrendRow> {
    queries
        .iter()
        .map(|q| TrendRow {
            trend_name: q.query.clone(),
            growth_score: match q.magnitude {
                Magnitude::Finite(v) => v,
                Magnitude::Breakout => BREAKOUT_SCORE,
            },
            seed_term: seed.to_string(),
            date: run_date,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::provider::InterestPoint;

    fn series(values: &[f64]) -> InterestSeries {
        InterestSeries {
            term: "test".into(),
            points: values
                .iter()
                .enumerate()
                .map(|(i, &v)| InterestPoint {
                    time: 1_717_200_000 + i as i64 * 3600,
                    value: v,
                })
                .collect(),
        }
    }

    fn run_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn mean_is_rounded_not_truncated() {
        let row = daily_interest("Oud", &series(&[10.111, 10.116]), run_date()).unwrap();
        // mean 10.1135 → 10.11 under 2-decimal rounding
        assert_eq!(row.interest, 10.11);
    }

    #[test]
    fn rounding_goes_up_at_half() {
        let row = daily_interest("Oud", &series(&[10.115, 10.115]), run_date()).unwrap();
        assert_eq!(row.interest, 10.12);
    }

    #[test]
    fn row_is_dated_to_run_date() {
        let row = daily_interest("Oud", &series(&[50.0]), run_date()).unwrap();
        assert_eq!(row.date, run_date());
        assert_eq!(row.keyword, "Oud");
    }

    #[test]
    fn empty_series_yields_no_row() {
        assert!(daily_interest("Oud", &series(&[]), run_date()).is_none());
    }

    #[test]
    fn breakout_becomes_fixed_score() {
        let queries = vec![
            RelatedQuery {
                query: "vanilla perfume dupe".into(),
                magnitude: Magnitude::Finite(1250.0),
            },
            RelatedQuery {
                query: "new release".into(),
                magnitude: Magnitude::Breakout,
            },
        ];
        let rows = rising_trends("perfume", &queries, run_date());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].growth_score, 1250.0);
        assert_eq!(rows[1].growth_score, BREAKOUT_SCORE);
        assert_eq!(rows[1].trend_name, "new release");
        assert_eq!(rows[1].seed_term, "perfume");
        assert_eq!(rows[1].date, run_date());
    }

    #[test]
    fn breakout_outranks_every_finite_magnitude() {
        // The source reports rising growth as a percentage; anything at or
        // above the breakout threshold is reported as the marker instead.
        let queries = vec![RelatedQuery {
            query: "hot".into(),
            magnitude: Magnitude::Finite(4999.0),
        }];
        let rows = rising_trends("seed", &queries, run_date());
        assert!(rows[0].growth_score < BREAKOUT_SCORE);
    }

    #[test]
    fn empty_rising_set_yields_zero_rows() {
        assert!(rising_trends("perfume", &[], run_date()).is_empty());
    }
}
