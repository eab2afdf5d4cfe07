//! Chart API adapter for historical daily prices.
//!
//! The price source is a managed API, so there is no mandated pre-request
//! delay; a small governor quota keeps the collector polite instead. One call
//! requests the full lookback window for one symbol. Holiday rows come back
//! with every field null and are dropped during parsing.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use governor::{clock::DefaultClock, state::InMemoryState, state::NotKeyed, Quota, RateLimiter};
use serde::Deserialize;

use equity_snap_core::config::YahooConfig;
use equity_snap_core::domain::{PriceBar, PriceSeries, SourceKind};
use equity_snap_core::error::FetchError;
use equity_snap_core::outcome::FetchOutcome;
use equity_snap_core::traits::SourceAdapter;

type GovernorLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Chart API response envelope.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

/// Source adapter for the daily price history API.
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
    symbol_suffix: String,
    lookback_days: i64,
    rate_limiter: Arc<GovernorLimiter>,
}

impl YahooClient {
    #[must_use]
    pub fn new(config: &YahooConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        let quota = Quota::per_second(
            NonZeroU32::new(config.requests_per_second.max(1)).expect("rate is nonzero"),
        );

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            symbol_suffix: config.symbol_suffix.clone(),
            lookback_days: config.lookback_days,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Ticker as the API knows it: universe symbol plus exchange suffix.
    fn ticker(&self, symbol: &str) -> String {
        format!("{}{}", symbol, self.symbol_suffix)
    }

    fn chart_url(&self, symbol: &str) -> String {
        let end = Utc::now();
        let start = end - chrono::Duration::days(self.lookback_days);
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
            self.base_url,
            self.ticker(symbol),
            start.timestamp(),
            end.timestamp()
        )
    }

    /// Turns the chart payload into a date-ordered series.
    fn parse_response(symbol: &str, resp: ChartResponse) -> FetchOutcome<PriceSeries> {
        if let Some(err) = &resp.chart.error {
            if err.code == "Not Found" {
                tracing::debug!(symbol, "Price source does not know this ticker");
                return FetchOutcome::Empty;
            }
            return FetchOutcome::Failed(FetchError::MalformedResponse(format!(
                "{}: {}",
                err.code, err.description
            )));
        }

        let Some(data) = resp.chart.result.and_then(|r| r.into_iter().next()) else {
            return FetchOutcome::Failed(FetchError::MalformedResponse(
                "empty result with no error".to_string(),
            ));
        };

        // A valid ticker with no trading history in the window has no timestamps.
        let Some(timestamps) = data.timestamp else {
            return FetchOutcome::Empty;
        };

        let Some(quote) = data.indicators.quote.into_iter().next() else {
            return FetchOutcome::Failed(FetchError::MalformedResponse(
                "no quote data".to_string(),
            ));
        };

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = match chrono::DateTime::from_timestamp(ts, 0) {
                Some(dt) => dt.date_naive(),
                None => {
                    return FetchOutcome::Failed(FetchError::MalformedResponse(format!(
                        "invalid timestamp: {ts}"
                    )))
                }
            };

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();

            // Holiday/non-trading rows are all null; partially null rows are
            // unusable either way.
            let (Some(open), Some(high), Some(low), Some(close)) = (open, high, low, close) else {
                continue;
            };

            bars.push(PriceBar {
                date,
                open,
                high,
                low,
                close,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            });
        }

        if bars.is_empty() {
            return FetchOutcome::Empty;
        }

        bars.sort_by_key(|bar| bar.date);
        FetchOutcome::Success(PriceSeries { bars })
    }
}

#[async_trait]
impl SourceAdapter for YahooClient {
    type Payload = PriceSeries;

    fn source(&self) -> SourceKind {
        SourceKind::Prices
    }

    async fn fetch(&self, symbol: &str, _identity: Option<&str>) -> FetchOutcome<PriceSeries> {
        self.rate_limiter.until_ready().await;

        let url = self.chart_url(symbol);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(err) => return FetchOutcome::Failed(transport_error(&err)),
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            // The API answers 404 with a "Not Found" chart error for unknown
            // tickers; either signal means the same thing.
            tracing::debug!(symbol, "Ticker not found");
            return FetchOutcome::Empty;
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(60);
            return FetchOutcome::Failed(FetchError::rate_limited(retry_after));
        }
        if !status.is_success() {
            return FetchOutcome::Failed(FetchError::api(
                status.as_u16(),
                format!("unexpected status for {}", self.ticker(symbol)),
            ));
        }

        let chart: ChartResponse = match response.json().await {
            Ok(chart) => chart,
            Err(err) => {
                return FetchOutcome::Failed(FetchError::MalformedResponse(format!(
                    "failed to decode chart response: {err}"
                )))
            }
        };

        let outcome = Self::parse_response(symbol, chart);
        if let FetchOutcome::Success(series) = &outcome {
            tracing::debug!(symbol, bars = series.bars.len(), "Fetched price history");
        }
        outcome
    }
}

fn transport_error(err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(err.to_string())
    } else if err.is_connect() {
        FetchError::Network(format!("connection failed: {err}"))
    } else {
        FetchError::Network(err.to_string())
    }
}
