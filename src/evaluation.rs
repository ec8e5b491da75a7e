// =============================================================================
// Evaluation — the single entry point the presentation layer calls
// =============================================================================
//
// series + entry/stop/current + strategy
//   -> indicator frame -> snapshot -> signal flags
//   -> risk levels (+ optional sizing)
//   -> recommendation
//
// `evaluate` is pure: no clock, no I/O, no shared state.  Degradations
// (`NotEnoughData`, `InvalidRiskInputs`) are collected into `issues` while
// every field that can still be computed is returned.
//
// `EvaluationEnvelope` adds the audit fields (id, ticker, timestamp) for the
// service layer.
// =============================================================================

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::AdvisorError;
use crate::indicator_engine::{IndicatorEngine, IndicatorSnapshot};
use crate::risk::{PositionSize, RiskLevels, SizingParams};
use crate::signal_flags::{SignalFlags, SignalLabels};
use crate::strategy::{Recommendation, Strategy};
use crate::types::PriceSeries;

/// Inputs to one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationInput<'a> {
    pub series: &'a PriceSeries,
    pub entry_price: f64,
    pub stop_price: f64,
    pub current_price: f64,
    pub strategy: Strategy,
    pub sizing: Option<SizingParams>,
}

/// Everything derived from one evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// Date of the bar the snapshot describes.
    pub as_of: NaiveDate,
    pub bars: usize,
    pub strategy: Strategy,
    pub current_price: f64,
    pub snapshot: IndicatorSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signals: Option<SignalFlags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_labels: Option<SignalLabels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend_status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_levels: Option<RiskLevels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_size: Option<PositionSize>,
    pub recommendation: Recommendation,
    /// Human-readable recommendation lines.
    pub lines: Vec<&'static str>,
    /// Degradations hit along the way.
    pub issues: Vec<AdvisorError>,
}

impl Evaluation {
    pub fn is_degraded(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Run the indicator and decision engines over one input set.
pub fn evaluate(input: &EvaluationInput<'_>) -> Evaluation {
    let mut issues = Vec::new();

    let frame = IndicatorEngine::compute(input.series);
    let snapshot = frame.snapshot();

    let signals = match SignalFlags::from_snapshot(&snapshot) {
        Ok(flags) => Some(flags),
        Err(e) => {
            issues.push(e);
            None
        }
    };

    let risk_levels = match RiskLevels::new(input.entry_price, input.stop_price) {
        Ok(levels) => Some(levels),
        Err(e) => {
            issues.push(e);
            None
        }
    };

    let position_size = match (risk_levels.as_ref(), input.sizing) {
        (Some(levels), Some(params)) => PositionSize::compute(levels, params),
        _ => None,
    };

    let recommendation = input
        .strategy
        .decide(signals.as_ref(), risk_levels.as_ref(), input.current_price);
    let lines = recommendation.lines();

    let as_of = input.series.latest().date;
    if issues.is_empty() {
        debug!(%as_of, strategy = %input.strategy, ?lines, "evaluation complete");
    } else {
        info!(
            %as_of,
            strategy = %input.strategy,
            issues = ?issues.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "evaluation degraded"
        );
    }

    Evaluation {
        as_of,
        bars: input.series.len(),
        strategy: input.strategy,
        current_price: input.current_price,
        snapshot,
        signals,
        signal_labels: signals.map(|s| s.labels()),
        trend_status: signals.map(|s| s.trend_status()),
        risk_levels,
        position_size,
        recommendation,
        lines,
        issues,
    }
}

/// Auditable record of a served evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationEnvelope {
    /// Unique identifier (UUID v4).
    pub id: String,
    pub ticker: String,
    /// ISO 8601 timestamp of when the evaluation was served.
    pub created_at: String,
    #[serde(flatten)]
    pub evaluation: Evaluation,
}

impl EvaluationEnvelope {
    pub fn new(ticker: impl Into<String>, evaluation: Evaluation) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            ticker: ticker.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
            evaluation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{Action, Advisory};
    use crate::types::test_support::series_from_closes;

    fn uptrend(n: usize) -> PriceSeries {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64 * 0.5).collect();
        series_from_closes(&closes)
    }

    fn input(series: &PriceSeries, entry: f64, stop: f64, current: f64, strategy: Strategy) -> EvaluationInput<'_> {
        EvaluationInput {
            series,
            entry_price: entry,
            stop_price: stop,
            current_price: current,
            strategy,
            sizing: None,
        }
    }

    #[test]
    fn full_history_uptrend_single_action() {
        let series = uptrend(200);
        let eval = evaluate(&input(&series, 100.0, 90.0, 125.0, Strategy::SingleAction));

        assert!(!eval.is_degraded());
        assert_eq!(eval.bars, 200);
        assert!(eval.signals.unwrap().trend_ok);
        assert_eq!(eval.trend_status, Some("TREND OK"));
        assert_eq!(
            eval.recommendation,
            Recommendation::SingleAction {
                action: Action::MoveStopToBreakeven
            }
        );
        assert_eq!(eval.lines, vec!["MOVE STOP TO BREAKEVEN"]);
    }

    #[test]
    fn short_history_surfaces_not_enough_data() {
        let series = uptrend(100);
        let eval = evaluate(&input(&series, 100.0, 90.0, 125.0, Strategy::SingleAction));

        assert!(eval.signals.is_none());
        assert!(eval.risk_levels.is_some());
        assert!(eval.snapshot.ema21.is_some());
        assert!(eval.snapshot.ema144.is_none());
        assert!(matches!(eval.issues[0], AdvisorError::NotEnoughData { .. }));
        assert_eq!(
            eval.recommendation,
            Recommendation::SingleAction {
                action: Action::NotEnoughData
            }
        );
    }

    #[test]
    fn invalid_risk_inputs_degrade_to_incomplete() {
        let series = uptrend(200);
        let eval = evaluate(&input(&series, 100.0, 100.0, 125.0, Strategy::SingleAction));

        assert!(eval.risk_levels.is_none());
        assert!(eval.signals.is_some());
        assert_eq!(
            eval.issues,
            vec![AdvisorError::InvalidRiskInputs {
                entry: 100.0,
                stop: 100.0
            }]
        );
        assert_eq!(
            eval.recommendation,
            Recommendation::SingleAction {
                action: Action::Incomplete
            }
        );
    }

    #[test]
    fn advisory_strategy_reports_lines() {
        let series = uptrend(200);
        let eval = evaluate(&input(&series, 100.0, 90.0, 135.0, Strategy::Advisory));
        match &eval.recommendation {
            Recommendation::Advisory { advisories } => {
                assert!(advisories.contains(&Advisory::MoveStopToBreakeven));
                assert!(advisories.contains(&Advisory::ConsiderTrailingStopOrPartialExit));
            }
            other => panic!("expected advisory, got {other:?}"),
        }
        assert!(eval.signal_labels.is_some());
    }

    #[test]
    fn zero_current_price_waits() {
        let series = uptrend(200);
        let eval = evaluate(&input(&series, 100.0, 90.0, 0.0, Strategy::SingleAction));
        assert_eq!(eval.lines, vec!["WAIT"]);
    }

    #[test]
    fn sizing_is_attached_when_levels_valid() {
        let series = uptrend(200);
        let mut inp = input(&series, 100.0, 95.0, 101.0, Strategy::SingleAction);
        inp.sizing = Some(SizingParams {
            capital: 10_000.0,
            risk_pct: 1.0,
        });
        let eval = evaluate(&inp);
        assert_eq!(eval.position_size.unwrap().shares, 20);
    }

    #[test]
    fn envelope_flattens_evaluation() {
        let series = uptrend(200);
        let eval = evaluate(&input(&series, 100.0, 90.0, 125.0, Strategy::SingleAction));
        let env = EvaluationEnvelope::new("AAPL", eval);
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["ticker"], "AAPL");
        assert_eq!(json["bars"], 200);
        assert_eq!(json["recommendation"]["action"], "move_stop_to_breakeven");
        assert!(json["id"].as_str().unwrap().len() >= 32);
    }
}
