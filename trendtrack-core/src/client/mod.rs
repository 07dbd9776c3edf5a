//! Signal client — provider trait, Google Trends implementation, throttling.

pub mod google;
pub mod provider;
pub mod throttle;

pub use google::{ClientOptions, GoogleTrendsClient};
pub use provider::{
    InterestPoint, InterestSeries, Magnitude, RelatedQuery, SignalError, SignalProvider, Window,
};
pub use throttle::Throttle;
