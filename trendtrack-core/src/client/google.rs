//! Google Trends signal provider.
//!
//! Talks to the unofficial Trends JSON API in two steps: an `explore` call
//! that returns per-widget tokens, then a `widgetdata` call for the widget
//! we care about (interest-over-time or related queries). Every response
//! body carries an anti-JSON guard prefix that must be stripped before
//! parsing.
//!
//! Google Trends has no official API and is subject to unannounced format
//! changes. The client performs no retries; a failed term is the caller's
//! problem to skip or reschedule.

use super::provider::{
    InterestPoint, InterestSeries, Magnitude, RelatedQuery, SignalError, SignalProvider, Window,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

const EXPLORE_URL: &str = "https://trends.google.com/trends/api/explore";
const MULTILINE_URL: &str = "https://trends.google.com/trends/api/widgetdata/multiline";
const RELATED_URL: &str = "https://trends.google.com/trends/api/widgetdata/relatedsearches";

const TIMESERIES_WIDGET: &str = "TIMESERIES";
const RELATED_QUERIES_WIDGET: &str = "RELATED_QUERIES";

/// The explore endpoint rejects payloads with more comparison items.
const MAX_COMPARISON_ITEMS: usize = 5;

/// The marker the source uses for growth it cannot express as a ratio.
const BREAKOUT_MARKER: &str = "Breakout";

/// Session-level query knobs, with the interface language and timezone
/// offset the original tracker used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Interface language, e.g. `en-US`.
    pub hl: String,
    /// Timezone offset in minutes west of UTC.
    pub tz: i32,
    /// Category filter (0 = all categories).
    pub category: u32,
    /// Search property ("" = web search; alternatives: images, news, youtube).
    pub property: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            hl: "en-US".into(),
            tz: 360,
            category: 0,
            property: String::new(),
        }
    }
}

// ── Wire format ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    widgets: Vec<Widget>,
}

#[derive(Debug, Deserialize)]
struct Widget {
    id: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct MultilineResponse {
    default: Option<Timeline>,
}

#[derive(Debug, Deserialize)]
struct Timeline {
    #[serde(rename = "timelineData", default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
struct TimelinePoint {
    time: String,
    #[serde(default)]
    value: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct RelatedResponse {
    default: Option<RankedLists>,
}

#[derive(Debug, Deserialize)]
struct RankedLists {
    #[serde(rename = "rankedList", default)]
    ranked_list: Vec<RankedList>,
}

#[derive(Debug, Deserialize)]
struct RankedList {
    #[serde(rename = "rankedKeyword", default)]
    ranked_keyword: Vec<RankedKeyword>,
}

#[derive(Debug, Deserialize)]
struct RankedKeyword {
    query: String,
    #[serde(default)]
    value: Option<f64>,
    #[serde(rename = "formattedValue", default)]
    formatted_value: String,
}

// ── Client ──────────────────────────────────────────────────────────

/// Google Trends signal provider.
pub struct GoogleTrendsClient {
    client: reqwest::blocking::Client,
    opts: ClientOptions,
}

impl GoogleTrendsClient {
    pub fn new(opts: ClientOptions) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");

        Self { client, opts }
    }

    /// One GET against an API endpoint, returning the raw body.
    ///
    /// Maps HTTP-level failures to the error taxonomy; does not retry.
    fn get_api(&self, url: &str, params: &[(&str, String)]) -> Result<String, SignalError> {
        let resp = self
            .client
            .get(url)
            .query(params)
            .send()
            .map_err(|e| SignalError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();

        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(SignalError::Blocked);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(SignalError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            return Err(SignalError::Other(format!("HTTP {status} for {url}")));
        }

        resp.text()
            .map_err(|e| SignalError::NetworkUnreachable(e.to_string()))
    }

    /// Run the explore step and return the widget list for one term.
    fn explore(&self, term: &str, window: Window, geo: &str) -> Result<ExploreResponse, SignalError> {
        let req = explore_payload(&[term], window, geo, &self.opts)?;
        let body = self.get_api(
            EXPLORE_URL,
            &[
                ("hl", self.opts.hl.clone()),
                ("tz", self.opts.tz.to_string()),
                ("req", req),
            ],
        )?;
        parse_guarded(&body)
    }

    /// Fetch one widget's data using the token from the explore step.
    fn widget_data<T: DeserializeOwned>(
        &self,
        url: &str,
        token: String,
        request: &serde_json::Value,
    ) -> Result<T, SignalError> {
        let req = serde_json::to_string(request)
            .map_err(|e| SignalError::Other(format!("widget request serialization: {e}")))?;
        let body = self.get_api(
            url,
            &[
                ("hl", self.opts.hl.clone()),
                ("tz", self.opts.tz.to_string()),
                ("req", req),
                ("token", token),
            ],
        )?;
        parse_guarded(&body)
    }
}

impl SignalProvider for GoogleTrendsClient {
    fn name(&self) -> &str {
        "google_trends"
    }

    fn interest_over_time(
        &self,
        term: &str,
        window: Window,
        geo: &str,
    ) -> Result<InterestSeries, SignalError> {
        let widgets = self.explore(term, window, geo)?;
        let (token, request) = find_widget(widgets, TIMESERIES_WIDGET, term)?;
        let resp: MultilineResponse = self.widget_data(MULTILINE_URL, token, &request)?;

        let timeline = resp.default.ok_or_else(|| SignalError::NoData {
            term: term.to_string(),
        })?;

        let points = timeline
            .timeline_data
            .iter()
            .filter_map(|p| {
                let value = p.value.first().copied()?;
                let time = p.time.parse::<i64>().ok()?;
                Some(InterestPoint { time, value })
            })
            .collect();

        Ok(InterestSeries {
            term: term.to_string(),
            points,
        })
    }

    fn rising_queries(
        &self,
        term: &str,
        window: Window,
        geo: &str,
    ) -> Result<Vec<RelatedQuery>, SignalError> {
        let widgets = self.explore(term, window, geo)?;
        let (token, request) = find_widget(widgets, RELATED_QUERIES_WIDGET, term)?;
        let resp: RelatedResponse = self.widget_data(RELATED_URL, token, &request)?;

        // rankedList[0] holds top queries, rankedList[1] the rising set.
        // A seed with no rising queries is a valid empty result.
        let rising = resp
            .default
            .and_then(|lists| lists.ranked_list.into_iter().nth(1))
            .map(|list| list.ranked_keyword)
            .unwrap_or_default();

        Ok(rising.into_iter().map(parse_ranked_keyword).collect())
    }
}

// ── Parsing helpers ─────────────────────────────────────────────────

/// Strip the anti-JSON guard prefix the API puts before every body.
fn strip_guard(body: &str) -> Result<&str, SignalError> {
    body.find('{')
        .map(|i| &body[i..])
        .ok_or_else(|| SignalError::ResponseFormatChanged("no JSON object in response".into()))
}

fn parse_guarded<T: DeserializeOwned>(body: &str) -> Result<T, SignalError> {
    let json = strip_guard(body)?;
    serde_json::from_str(json)
        .map_err(|e| SignalError::ResponseFormatChanged(format!("failed to parse response: {e}")))
}

/// Build the explore `req` payload for up to [`MAX_COMPARISON_ITEMS`] terms.
fn explore_payload(
    terms: &[&str],
    window: Window,
    geo: &str,
    opts: &ClientOptions,
) -> Result<String, SignalError> {
    if terms.is_empty() || terms.len() > MAX_COMPARISON_ITEMS {
        return Err(SignalError::Other(format!(
            "explore payload takes 1..={MAX_COMPARISON_ITEMS} terms, got {}",
            terms.len()
        )));
    }

    let items: Vec<serde_json::Value> = terms
        .iter()
        .map(|t| {
            json!({
                "keyword": t,
                "time": window.timeframe(),
                "geo": geo,
            })
        })
        .collect();

    let payload = json!({
        "comparisonItem": items,
        "category": opts.category,
        "property": opts.property,
    });

    serde_json::to_string(&payload)
        .map_err(|e| SignalError::Other(format!("explore payload serialization: {e}")))
}

/// Pick the widget we need out of the explore response.
fn find_widget(
    resp: ExploreResponse,
    widget_id: &str,
    term: &str,
) -> Result<(String, serde_json::Value), SignalError> {
    resp.widgets
        .into_iter()
        .find_map(|w| {
            if w.id == widget_id {
                Some((w.token?, w.request?))
            } else {
                None
            }
        })
        .ok_or_else(|| {
            SignalError::ResponseFormatChanged(format!("no {widget_id} widget for '{term}'"))
        })
}

fn parse_ranked_keyword(kw: RankedKeyword) -> RelatedQuery {
    let magnitude = match kw.value {
        Some(v) if kw.formatted_value != BREAKOUT_MARKER => Magnitude::Finite(v),
        _ => Magnitude::Breakout,
    };
    RelatedQuery {
        query: kw.query,
        magnitude,
    }
}
