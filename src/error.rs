// =============================================================================
// Advisor error taxonomy
// =============================================================================
//
// Only `NoDataFound` and `InvalidSeries` halt an evaluation.  `NotEnoughData`
// and `InvalidRiskInputs` are degradations: the evaluation still completes and
// reports them alongside the fields that remain valid.
// =============================================================================

use serde::Serialize;
use thiserror::Error;

/// Domain errors raised by the indicator and decision engines and by the
/// market data provider.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdvisorError {
    /// The provider returned no usable rows for the ticker.
    #[error("no data found for ticker '{ticker}'")]
    NoDataFound { ticker: String },

    /// The series is too short (or too flat) for one or more indicator fields.
    #[error("not enough data to compute: {}", missing.join(", "))]
    NotEnoughData { missing: Vec<String> },

    /// Entry/stop pair cannot define a per-share risk.
    #[error("invalid risk inputs: entry={entry}, stop={stop}")]
    InvalidRiskInputs { entry: f64, stop: f64 },

    /// A price series violated ordering or value rules at construction.
    #[error("invalid price series: {reason}")]
    InvalidSeries { reason: String },
}

impl AdvisorError {
    /// Whether the evaluation can continue past this condition.
    pub fn is_degradation(&self) -> bool {
        matches!(
            self,
            Self::NotEnoughData { .. } | Self::InvalidRiskInputs { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_enough_data_lists_fields() {
        let err = AdvisorError::NotEnoughData {
            missing: vec!["ema144".into(), "macd_signal".into()],
        };
        assert_eq!(err.to_string(), "not enough data to compute: ema144, macd_signal");
        assert!(err.is_degradation());
    }

    #[test]
    fn no_data_found_is_fatal() {
        let err = AdvisorError::NoDataFound { ticker: "ZZZZ".into() };
        assert!(!err.is_degradation());
        assert!(err.to_string().contains("ZZZZ"));
    }

    #[test]
    fn serialises_with_kind_tag() {
        let err = AdvisorError::InvalidRiskInputs { entry: 100.0, stop: 100.0 };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "invalid_risk_inputs");
        assert_eq!(json["entry"], 100.0);
    }
}
