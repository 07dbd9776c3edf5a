//! Property tests for merge invariants.
//!
//! Uses proptest to verify:
//! 1. Key uniqueness — no two rows share (date, key) after a merge
//! 2. Keep-last idempotence — merging the same batch twice equals once
//! 3. Keep-highest dominance — the surviving duplicate has the max score
//! 4. Sentinel bound — normalized growth scores never exceed the breakout score

use chrono::NaiveDate;
use proptest::prelude::*;
use std::collections::HashSet;
use trendtrack_core::domain::{InterestRow, MergeRow, TrendRow};
use trendtrack_core::normalize::{rising_trends, BREAKOUT_SCORE};
use trendtrack_core::store::{merge_rows, MergePolicy};
use trendtrack_core::{Magnitude, RelatedQuery};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1u32..=28).prop_map(|d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap())
}

fn arb_keyword() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["oud", "santal", "vanilla", "cherry", "amber"])
        .prop_map(|s| s.to_string())
}

fn arb_interest_row() -> impl Strategy<Value = InterestRow> {
    (arb_date(), arb_keyword(), 0.0..100.0f64).prop_map(|(date, keyword, interest)| InterestRow {
        date,
        keyword,
        interest: (interest * 100.0).round() / 100.0,
    })
}

fn arb_trend_row() -> impl Strategy<Value = TrendRow> {
    (arb_date(), arb_keyword(), 0.0..5000.0f64, arb_keyword()).prop_map(
        |(date, name, score, seed)| TrendRow {
            trend_name: name,
            growth_score: score.round(),
            seed_term: seed,
            date,
        },
    )
}

fn keys<R: MergeRow>(rows: &[R]) -> Vec<(NaiveDate, String)> {
    rows.iter().map(|r| (r.date(), r.key().to_string())).collect()
}

// ── 1. Key uniqueness ────────────────────────────────────────────────

proptest! {
    /// No two rows share (date, key) after a keep-last merge.
    #[test]
    fn keep_last_keys_are_unique(
        existing in prop::collection::vec(arb_interest_row(), 0..20),
        incoming in prop::collection::vec(arb_interest_row(), 0..20),
    ) {
        let merged = merge_rows(existing, incoming, MergePolicy::KeepLast);
        let ks = keys(&merged);
        let unique: HashSet<_> = ks.iter().cloned().collect();
        prop_assert_eq!(ks.len(), unique.len());
    }

    /// No two rows share (date, key) after a keep-highest merge.
    #[test]
    fn keep_highest_keys_are_unique(
        existing in prop::collection::vec(arb_trend_row(), 0..20),
        incoming in prop::collection::vec(arb_trend_row(), 0..20),
    ) {
        let merged = merge_rows(existing, incoming, MergePolicy::KeepHighestScore);
        let ks = keys(&merged);
        let unique: HashSet<_> = ks.iter().cloned().collect();
        prop_assert_eq!(ks.len(), unique.len());
    }
}

// ── 2. Keep-last idempotence ─────────────────────────────────────────

proptest! {
    /// Merging the same batch into an unchanged store twice yields the
    /// same table as merging it once.
    #[test]
    fn keep_last_rerun_is_idempotent(
        store in prop::collection::vec(arb_interest_row(), 0..20),
        batch in prop::collection::vec(arb_interest_row(), 1..20),
    ) {
        let once = merge_rows(store.clone(), batch.clone(), MergePolicy::KeepLast);
        let twice = merge_rows(once.clone(), batch, MergePolicy::KeepLast);
        prop_assert_eq!(once, twice);
    }

    /// Every incoming key wins over an existing row with the same key.
    #[test]
    fn keep_last_incoming_wins(
        store in prop::collection::vec(arb_interest_row(), 0..20),
        batch in prop::collection::vec(arb_interest_row(), 1..20),
    ) {
        let merged = merge_rows(store, batch.clone(), MergePolicy::KeepLast);
        // Walk the batch backwards: the last occurrence per key is the one
        // that must survive.
        let mut expected: Vec<&InterestRow> = Vec::new();
        for row in batch.iter().rev() {
            if !expected.iter().any(|r| r.date == row.date && r.keyword == row.keyword) {
                expected.push(row);
            }
        }
        for want in expected {
            let got = merged
                .iter()
                .find(|r| r.date == want.date && r.keyword == want.keyword)
                .expect("batch key missing from merge");
            prop_assert_eq!(got.interest, want.interest);
        }
    }
}

// ── 3. Keep-highest dominance ────────────────────────────────────────

proptest! {
    /// The survivor for each key carries the maximum score seen for it.
    #[test]
    fn keep_highest_survivor_has_max_score(
        existing in prop::collection::vec(arb_trend_row(), 0..20),
        incoming in prop::collection::vec(arb_trend_row(), 0..20),
    ) {
        let all: Vec<TrendRow> = existing.iter().chain(incoming.iter()).cloned().collect();
        let merged = merge_rows(existing, incoming, MergePolicy::KeepHighestScore);
        for row in &merged {
            let max = all
                .iter()
                .filter(|r| r.date == row.date && r.trend_name == row.trend_name)
                .map(|r| r.growth_score)
                .fold(f64::NEG_INFINITY, f64::max);
            prop_assert_eq!(row.growth_score, max);
        }
    }
}

// ── 4. Sentinel bound ────────────────────────────────────────────────

proptest! {
    /// Normalized growth scores are numeric and never exceed the breakout
    /// score, which is exactly what the sentinel maps to.
    #[test]
    fn normalized_scores_are_bounded(
        finite in prop::collection::vec(0.0..4999.0f64, 0..10),
        breakouts in 0usize..3,
    ) {
        let mut queries: Vec<RelatedQuery> = finite
            .iter()
            .map(|&v| RelatedQuery { query: format!("q{v}"), magnitude: Magnitude::Finite(v) })
            .collect();
        for i in 0..breakouts {
            queries.push(RelatedQuery {
                query: format!("b{i}"),
                magnitude: Magnitude::Breakout,
            });
        }

        let rows = rising_trends("seed", &queries, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        prop_assert_eq!(rows.len(), queries.len());
        for row in &rows {
            prop_assert!(row.growth_score.is_finite());
            prop_assert!(row.growth_score <= BREAKOUT_SCORE);
        }
        let breakout_rows = rows.iter().filter(|r| r.growth_score == BREAKOUT_SCORE).count();
        prop_assert_eq!(breakout_rows, breakouts);
    }
}
