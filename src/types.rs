// =============================================================================
// Shared price types used across the advisor
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AdvisorError;

/// One daily OHLC bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
        }
    }
}

/// Chronologically ordered, non-empty daily bars with unique dates.
///
/// Gaps (weekends, holidays) are allowed.  The bars cannot be mutated after
/// construction; derived data is always computed into new values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Validate and wrap `bars`.
    ///
    /// # Errors
    /// `InvalidSeries` when the input is empty, out of order, has a duplicate
    /// date, a non-finite price, or a bar whose low exceeds its high.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, AdvisorError> {
        if bars.is_empty() {
            return Err(invalid("series is empty"));
        }

        for (i, bar) in bars.iter().enumerate() {
            let prices = [bar.open, bar.high, bar.low, bar.close];
            if prices.iter().any(|p| !p.is_finite()) {
                return Err(invalid(format!("non-finite price on {}", bar.date)));
            }
            if bar.low > bar.high {
                return Err(invalid(format!(
                    "low {} above high {} on {}",
                    bar.low, bar.high, bar.date
                )));
            }
            if i > 0 {
                let prev = bars[i - 1].date;
                if bar.date == prev {
                    return Err(invalid(format!("duplicate date {}", bar.date)));
                }
                if bar.date < prev {
                    return Err(invalid(format!("{} follows {}", bar.date, prev)));
                }
            }
        }

        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The most recent bar.
    pub fn latest(&self) -> &PriceBar {
        // Non-empty by construction.
        &self.bars[self.bars.len() - 1]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }
}

fn invalid(reason: impl Into<String>) -> AdvisorError {
    AdvisorError::InvalidSeries {
        reason: reason.into(),
    }
}
