// =============================================================================
// Risk Levels — R-multiple price targets and position sizing
// =============================================================================
//
//   risk_per_share = |entry - stop|
//   R_n            = entry + n * risk_per_share      (n = 1, 2, 3)
//
// Valid only when entry > 0, stop > 0 and entry != stop, so risk_per_share is
// strictly positive and R1 < R2 < R3 always holds.
//
// Position sizing turns the account's risk budget into a share count:
//   risk_budget = capital * risk_pct / 100
//   shares      = floor(risk_budget / risk_per_share)
// It is informational; no decision rule reads it.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AdvisorError;

// ---------------------------------------------------------------------------
// R levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskLevels {
    pub entry_price: f64,
    pub stop_price: f64,
    pub risk_per_share: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
}

impl RiskLevels {
    /// Build the R ladder for an entry/stop pair.
    ///
    /// # Errors
    /// `InvalidRiskInputs` when either price is not a positive finite number
    /// or the two are equal.
    pub fn new(entry_price: f64, stop_price: f64) -> Result<Self, AdvisorError> {
        let valid = entry_price.is_finite()
            && stop_price.is_finite()
            && entry_price > 0.0
            && stop_price > 0.0
            && entry_price != stop_price;

        if !valid {
            return Err(AdvisorError::InvalidRiskInputs {
                entry: entry_price,
                stop: stop_price,
            });
        }

        let risk_per_share = (entry_price - stop_price).abs();
        let levels = Self {
            entry_price,
            stop_price,
            risk_per_share,
            r1: entry_price + risk_per_share,
            r2: entry_price + risk_per_share * 2.0,
            r3: entry_price + risk_per_share * 3.0,
        };

        debug!(
            entry_price,
            stop_price,
            risk_per_share,
            r1 = levels.r1,
            r2 = levels.r2,
            r3 = levels.r3,
            "risk levels computed"
        );

        Ok(levels)
    }

    /// Level for multiple `n` (1, 2 or 3).
    pub fn level(&self, n: u8) -> Option<f64> {
        match n {
            1 => Some(self.r1),
            2 => Some(self.r2),
            3 => Some(self.r3),
            _ => None,
        }
    }

    /// Levels rounded to cents for display.  The struct keeps full precision.
    pub fn display_levels(&self) -> [String; 3] {
        [
            format!("1R: {:.2}", self.r1),
            format!("2R: {:.2}", self.r2),
            format!("3R: {:.2}", self.r3),
        ]
    }
}

// ---------------------------------------------------------------------------
// Position sizing
// ---------------------------------------------------------------------------

/// Account-level sizing inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingParams {
    /// Account capital in quote currency.
    pub capital: f64,
    /// Percentage of capital risked per trade (e.g. 2.0 = 2 %).
    pub risk_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionSize {
    pub risk_budget: f64,
    pub shares: u64,
    /// Loss if the stop is hit with `shares` held.
    pub capital_at_risk: f64,
}

impl PositionSize {
    /// Returns `None` when the sizing inputs are out of range.
    pub fn compute(levels: &RiskLevels, params: SizingParams) -> Option<Self> {
        if !(params.capital.is_finite() && params.capital > 0.0) {
            return None;
        }
        if !(params.risk_pct > 0.0 && params.risk_pct <= 100.0) {
            return None;
        }

        let risk_budget = params.capital * params.risk_pct / 100.0;
        let shares = (risk_budget / levels.risk_per_share).floor();
        if !shares.is_finite() || shares < 0.0 {
            return None;
        }
        let shares = shares as u64;

        Some(Self {
            risk_budget,
            shares,
            capital_at_risk: shares as f64 * levels.risk_per_share,
        })
    }
}
