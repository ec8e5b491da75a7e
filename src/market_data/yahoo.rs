// =============================================================================
// Yahoo Finance chart client — daily OHLC history
// =============================================================================
//
// Public endpoint, no signing:
//   GET {base}/v8/finance/chart/{ticker}?range={lookback}&interval=1d
//
// Response shape (abridged):
//   { "chart": { "result": [ { "meta": { "gmtoffset": -14400, ... },
//                              "timestamp": [ ... ],
//                              "indicators": { "quote": [ { "open": [...],
//                                  "high": [...], "low": [...], "close": [...] } ] } } ],
//                "error": null } }
//
// Rows with any null OHLC value are dropped.  Timestamps are shifted by the
// exchange's gmtoffset before taking the calendar date.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::DateTime;
use tracing::{debug, instrument, warn};

use crate::error::AdvisorError;
use crate::market_data::Lookback;
use crate::types::PriceBar;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// HTTP client for the chart endpoint.
#[derive(Clone)]
pub struct YahooChartClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooChartClient {
    /// Create a client against `base_url` with a per-request `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; trend-r-advisor/1.0)")
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "YahooChartClient initialised");

        Ok(Self { base_url, client })
    }

    /// Chart URL for `ticker`, which is pushed as a single escaped path segment.
    fn chart_url(&self, ticker: &str, lookback: Lookback) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("invalid chart base url {}", self.base_url))?;

        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("chart base url {} cannot carry a path", self.base_url))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", ticker]);

        url.query_pairs_mut()
            .append_pair("range", lookback.as_range())
            .append_pair("interval", "1d");

        Ok(url)
    }

    /// Fetch daily bars for an already-normalised `ticker`.
    ///
    /// Fails with [`AdvisorError::NoDataFound`] (wrapped in `anyhow`) on a 404,
    /// a chart-level error, or no usable rows.  Any other non-success status
    /// is a plain provider failure.
    #[instrument(skip(self), name = "yahoo::daily_bars")]
    pub async fn daily_bars(&self, ticker: &str, lookback: Lookback) -> Result<Vec<PriceBar>> {
        let url = self.chart_url(ticker, lookback)?;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET chart for {ticker} failed"))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            warn!(ticker, %status, "chart endpoint does not know the ticker");
            return Err(no_data(ticker));
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(ticker, %status, "chart endpoint returned error status");
            anyhow::bail!("chart endpoint returned {} for {}: {}", status, ticker, text);
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .with_context(|| format!("failed to parse chart response for {ticker}"))?;

        let bars = parse_chart_response(ticker, &body)?;
        debug!(ticker, count = bars.len(), "daily bars fetched");
        Ok(bars)
    }
}

impl std::fmt::Debug for YahooChartClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooChartClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn no_data(ticker: &str) -> anyhow::Error {
    AdvisorError::NoDataFound {
        ticker: ticker.to_string(),
    }
    .into()
}

/// Convert a chart JSON body into chronological bars with unique dates.
///
/// When two rows land on the same calendar date (the provider sometimes
/// appends a live intraday row), the later one wins.
pub fn parse_chart_response(ticker: &str, body: &serde_json::Value) -> Result<Vec<PriceBar>> {
    let chart = &body["chart"];

    if !chart["error"].is_null() {
        warn!(ticker, error = %chart["error"], "chart endpoint reported an error");
        return Err(no_data(ticker));
    }

    let Some(result) = chart["result"].as_array().and_then(|r| r.first()) else {
        return Err(no_data(ticker));
    };

    let gmtoffset = result["meta"]["gmtoffset"].as_i64().unwrap_or(0);

    let Some(timestamps) = result["timestamp"].as_array() else {
        return Err(no_data(ticker));
    };

    let quote = &result["indicators"]["quote"][0];
    let column = |name: &str| -> Vec<Option<f64>> {
        quote[name]
            .as_array()
            .map(|arr| arr.iter().map(serde_json::Value::as_f64).collect())
            .unwrap_or_default()
    };
    let (opens, highs, lows, closes) = (column("open"), column("high"), column("low"), column("close"));

    let mut bars: Vec<PriceBar> = Vec::with_capacity(timestamps.len());
    let mut dropped = 0usize;

    for (i, ts) in timestamps.iter().enumerate() {
        let row = (
            ts.as_i64(),
            opens.get(i).copied().flatten(),
            highs.get(i).copied().flatten(),
            lows.get(i).copied().flatten(),
            closes.get(i).copied().flatten(),
        );
        let (Some(ts), Some(open), Some(high), Some(low), Some(close)) = row else {
            dropped += 1;
            continue;
        };
        let Some(date) = DateTime::from_timestamp(ts + gmtoffset, 0).map(|dt| dt.date_naive())
        else {
            dropped += 1;
            continue;
        };

        let bar = PriceBar::new(date, open, high, low, close);
        match bars.last().map(|b| b.date) {
            Some(prev) if prev == date => {
                if let Some(last) = bars.last_mut() {
                    *last = bar;
                }
            }
            Some(prev) if prev > date => dropped += 1,
            _ => bars.push(bar),
        }
    }

    if dropped > 0 {
        debug!(ticker, dropped, "dropped incomplete or out-of-order rows");
    }

    if bars.is_empty() {
        return Err(no_data(ticker));
    }

    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    // 2024-03-01 14:30 UTC and the two following days.
    const T0: i64 = 1_709_303_400;
    const DAY: i64 = 86_400;

    fn body(timestamps: Vec<i64>, closes: Vec<Option<f64>>) -> serde_json::Value {
        let n = timestamps.len();
        json!({
            "chart": {
                "result": [{
                    "meta": { "gmtoffset": -18000 },
                    "timestamp": timestamps,
                    "indicators": { "quote": [{
                        "open": vec![10.0; n],
                        "high": vec![12.0; n],
                        "low": vec![9.0; n],
                        "close": closes,
                    }]}
                }],
                "error": null
            }
        })
    }

    #[test]
    fn parses_rows_into_bars() {
        let b = body(vec![T0, T0 + DAY, T0 + 2 * DAY], vec![Some(11.0), Some(11.5), Some(11.2)]);
        let bars = parse_chart_response("AAPL", &b).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(bars[2].close, 11.2);
        assert_eq!(bars[1].high, 12.0);
    }

    #[test]
    fn drops_rows_with_nulls() {
        let b = body(vec![T0, T0 + DAY, T0 + 2 * DAY], vec![Some(11.0), None, Some(11.2)]);
        let bars = parse_chart_response("AAPL", &b).unwrap();
        assert_eq!(bars.len(), 2);
    }

    #[test]
    fn same_date_keeps_latest_row() {
        let b = body(vec![T0, T0 + 3_600], vec![Some(11.0), Some(11.7)]);
        let bars = parse_chart_response("AAPL", &b).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 11.7);
    }

    #[test]
    fn chart_error_is_no_data_found() {
        let b = json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        });
        let err = parse_chart_response("ZZZZ", &b).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AdvisorError>(),
            Some(&AdvisorError::NoDataFound {
                ticker: "ZZZZ".into()
            })
        );
    }

    #[test]
    fn all_null_rows_is_no_data_found() {
        let b = body(vec![T0, T0 + DAY], vec![None, None]);
        let err = parse_chart_response("AAPL", &b).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AdvisorError>(),
            Some(AdvisorError::NoDataFound { .. })
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = YahooChartClient::new("http://localhost:9/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://localhost:9");
    }

    #[test]
    fn chart_url_escapes_ticker_and_sets_query() {
        let client = YahooChartClient::new("http://localhost:9", Duration::from_secs(1)).unwrap();

        let url = client.chart_url("2330.TW", Lookback::OneYear).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9/v8/finance/chart/2330.TW?range=1y&interval=1d"
        );

        let url = client.chart_url("A/B?RANGE=5Y#", Lookback::SixMonths).unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/A%2FB%3FRANGE=5Y%23");
        assert_eq!(url.query(), Some("range=6mo&interval=1d"));
    }

    // ---------------------------------------------------------------------
    // daily_bars against a local stub server
    // ---------------------------------------------------------------------

    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;

    /// Serve `app` on an ephemeral port and return a client pointed at it.
    async fn client_for(app: Router) -> YahooChartClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        YahooChartClient::new(format!("http://{addr}"), Duration::from_secs(5)).unwrap()
    }

    fn respond(status: StatusCode, body: String) -> Router {
        Router::new().fallback(move || {
            let body = body.clone();
            async move { (status, body) }
        })
    }

    #[tokio::test]
    async fn daily_bars_parses_success_body() {
        let chart = body(vec![T0, T0 + DAY], vec![Some(11.0), Some(11.5)]).to_string();
        // Only the exact chart path answers 200; anything else falls through to 500.
        let app = Router::new()
            .route(
                "/v8/finance/chart/AAPL",
                get(move || {
                    let chart = chart.clone();
                    async move { (StatusCode::OK, chart) }
                }),
            )
            .fallback(|| async { StatusCode::INTERNAL_SERVER_ERROR });
        let client = client_for(app).await;

        let bars = client.daily_bars("AAPL", Lookback::OneYear).await.unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, 11.5);
    }

    #[tokio::test]
    async fn daily_bars_json_404_is_no_data_found() {
        let payload = json!({ "chart": { "result": null, "error": { "code": "Not Found" } } });
        let client = client_for(respond(StatusCode::NOT_FOUND, payload.to_string())).await;

        let err = client.daily_bars("ZZZZ", Lookback::OneYear).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AdvisorError>(),
            Some(AdvisorError::NoDataFound { .. })
        ));
    }

    #[tokio::test]
    async fn daily_bars_html_404_is_no_data_found() {
        let client = client_for(respond(StatusCode::NOT_FOUND, "<html>Not Found</html>".into())).await;

        let err = client.daily_bars("ZZZZ", Lookback::OneYear).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<AdvisorError>(),
            Some(&AdvisorError::NoDataFound {
                ticker: "ZZZZ".into()
            })
        );
    }

    #[tokio::test]
    async fn daily_bars_server_error_is_provider_failure() {
        let client = client_for(respond(StatusCode::INTERNAL_SERVER_ERROR, "upstream down".into())).await;

        let err = client.daily_bars("AAPL", Lookback::OneYear).await.unwrap_err();
        assert!(err.downcast_ref::<AdvisorError>().is_none());
        let msg = format!("{err:#}");
        assert!(msg.contains("500"), "{msg}");
        assert!(msg.contains("upstream down"), "{msg}");
    }
}
