// =============================================================================
// Market Data Provider — resolves a ticker into a validated daily series
// =============================================================================
//
// normalise ticker -> cache lookup (ticker, today, lookback) -> fetch on miss
// -> validate into PriceSeries -> cache.
//
// The indicator and decision engines never call this; they receive the
// resolved `PriceSeries`.
// =============================================================================

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, instrument};

use crate::error::AdvisorError;
use crate::market_data::{normalize_ticker, Lookback, SeriesCache, SeriesKey, YahooChartClient};
use crate::types::PriceSeries;

pub struct MarketDataProvider {
    client: YahooChartClient,
    cache: SeriesCache,
}

impl MarketDataProvider {
    pub fn new(client: YahooChartClient) -> Self {
        Self {
            client,
            cache: SeriesCache::new(),
        }
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    /// Fetch (or serve from cache) the daily series for `ticker`.
    ///
    /// Blank tickers and empty provider responses fail with
    /// [`AdvisorError::NoDataFound`]; transport failures are plain `anyhow`
    /// errors.
    #[instrument(skip(self), name = "provider::fetch_daily_series")]
    pub async fn fetch_daily_series(&self, ticker: &str, lookback: Lookback) -> Result<PriceSeries> {
        let Some(symbol) = normalize_ticker(ticker) else {
            return Err(AdvisorError::NoDataFound {
                ticker: ticker.to_string(),
            }
            .into());
        };

        let key = SeriesKey {
            ticker: symbol.clone(),
            as_of: Utc::now().date_naive(),
            lookback,
        };

        if let Some(series) = self.cache.get(&key) {
            return Ok(series);
        }

        let bars = self.client.daily_bars(&symbol, lookback).await?;
        let series = PriceSeries::new(bars)
            .with_context(|| format!("provider returned an unusable series for {symbol}"))?;

        info!(
            ticker = %symbol,
            bars = series.len(),
            latest = %series.latest().date,
            "daily series resolved"
        );

        self.cache.insert(key, series.clone());
        Ok(series)
    }
}
