// =============================================================================
// Market Data — daily series for a ticker
// =============================================================================
//
// yahoo.rs          chart endpoint client + response parsing
// series_cache.rs   per-day cache of resolved series
// provider.rs       normalise -> cache -> fetch -> validate
//
// Tickers are normalised here before they reach the cache or the network.
// =============================================================================

pub mod provider;
pub mod series_cache;
pub mod yahoo;

pub use provider::MarketDataProvider;
pub use series_cache::{SeriesCache, SeriesKey};
pub use yahoo::YahooChartClient;

use serde::{Deserialize, Serialize};

/// Named history window requested from the provider (daily bars).
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lookback {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
}

impl Lookback {
    pub fn as_range(&self) -> &'static str {
        match self {
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
        }
    }
}

impl Default for Lookback {
    fn default() -> Self {
        // 6mo of daily bars is shorter than the 144-bar EMA window.
        Self::OneYear
    }
}

/// Canonical provider symbol for user input.
///
/// Purely numeric codes are Taiwan listings (`2330` -> `2330.TW`); everything
/// else is trimmed and upper-cased.  Returns `None` for blank input or for any
/// character outside `A-Z 0-9 . ^ = -`.
pub fn normalize_ticker(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Some(format!("{trimmed}.TW"));
    }

    let symbol = trimmed.to_ascii_uppercase();
    if !symbol.chars().all(is_symbol_char) {
        return None;
    }
    Some(symbol)
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '^' | '=' | '-')
}
