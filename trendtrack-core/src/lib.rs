//! TrendTrack Core — signal client, rate limiter, normalizer, and merge store.
//!
//! This crate contains the machinery of the search-interest tracker:
//! - Persisted row types and their merge identity (`domain`)
//! - The Google Trends client behind the `SignalProvider` trait (`client`)
//! - Fixed-interval request throttling (`client::throttle`)
//! - Raw-result normalization into canonical rows (`normalize`)
//! - The deduplicating CSV store with atomic rewrite (`store`)

pub mod client;
pub mod domain;
pub mod normalize;
pub mod store;

pub use client::provider::{
    InterestPoint, InterestSeries, Magnitude, RelatedQuery, SignalError, SignalProvider, Window,
};
pub use client::throttle::Throttle;
pub use client::{ClientOptions, GoogleTrendsClient};
pub use domain::{InterestRow, MergeRow, TrendRow};
pub use store::{CsvStore, MergePolicy, StoreError, StoreMeta};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types shared with the runner are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::InterestRow>();
        require_sync::<domain::InterestRow>();
        require_send::<domain::TrendRow>();
        require_sync::<domain::TrendRow>();
        require_send::<client::provider::SignalError>();
        require_sync::<client::provider::SignalError>();
        require_send::<client::throttle::Throttle>();
        require_sync::<client::throttle::Throttle>();
        require_send::<client::GoogleTrendsClient>();
        require_sync::<client::GoogleTrendsClient>();
    }
}
