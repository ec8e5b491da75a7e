// =============================================================================
// Indicator Engine — price series in, annotated series + snapshot out
// =============================================================================
//
// Runs every indicator over the full series and annotates each bar:
//   EMA 21 / 55 / 144 of close, MACD(12,26) + signal(9), Stochastic %K(9) / %D(3)
//
// The snapshot is the annotation of the latest bar.  Fields whose window is
// not yet available stay `None`; `missing_fields()` names them so the caller
// can surface `NotEnoughData` instead of silently treating them as zero.
// =============================================================================

use serde::Serialize;
use tracing::debug;

use crate::error::AdvisorError;
use crate::indicators::ema::calculate_ema;
use crate::indicators::macd::calculate_macd;
use crate::indicators::stochastic::calculate_stochastic;
use crate::types::{PriceBar, PriceSeries};

pub const EMA_FAST_SPAN: usize = 21;
pub const EMA_MID_SPAN: usize = 55;
pub const EMA_SLOW_SPAN: usize = 144;

/// Indicator values for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct IndicatorSnapshot {
    pub ema21: Option<f64>,
    pub ema55: Option<f64>,
    pub ema144: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub stoch_k: Option<f64>,
    pub stoch_d: Option<f64>,
}

impl IndicatorSnapshot {
    fn fields(&self) -> [(&'static str, Option<f64>); 7] {
        [
            ("ema21", self.ema21),
            ("ema55", self.ema55),
            ("ema144", self.ema144),
            ("macd", self.macd),
            ("macd_signal", self.macd_signal),
            ("stoch_k", self.stoch_k),
            ("stoch_d", self.stoch_d),
        ]
    }

    /// Names of the fields that are undefined for this bar.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.fields()
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(name, _)| *name)
            .collect()
    }

    /// True when every indicator field is defined.
    pub fn is_complete(&self) -> bool {
        self.fields().iter().all(|(_, v)| v.is_some())
    }

    /// `Ok(())` when complete, otherwise `NotEnoughData` naming the gaps.
    pub fn require_complete(&self) -> Result<(), AdvisorError> {
        if self.is_complete() {
            return Ok(());
        }
        Err(self.not_enough_data())
    }

    /// `NotEnoughData` naming the currently undefined fields.
    pub fn not_enough_data(&self) -> AdvisorError {
        AdvisorError::NotEnoughData {
            missing: self.missing_fields().into_iter().map(String::from).collect(),
        }
    }
}

/// A bar together with its indicator values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnotatedBar {
    #[serde(flatten)]
    pub bar: PriceBar,
    #[serde(flatten)]
    pub indicators: IndicatorSnapshot,
}

/// The fully annotated series.  Same length and order as the input.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorFrame {
    rows: Vec<AnnotatedBar>,
}

impl IndicatorFrame {
    pub fn rows(&self) -> &[AnnotatedBar] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Indicator values of the most recent bar.
    pub fn snapshot(&self) -> IndicatorSnapshot {
        self.rows
            .last()
            .map(|r| r.indicators)
            .unwrap_or_default()
    }
}

/// Stateless indicator pipeline.
pub struct IndicatorEngine;

impl IndicatorEngine {
    /// Annotate every bar of `series`.
    pub fn compute(series: &PriceSeries) -> IndicatorFrame {
        let closes = series.closes();
        let highs = series.highs();
        let lows = series.lows();

        let ema21 = calculate_ema(&closes, EMA_FAST_SPAN);
        let ema55 = calculate_ema(&closes, EMA_MID_SPAN);
        let ema144 = calculate_ema(&closes, EMA_SLOW_SPAN);
        let macd = calculate_macd(&closes);
        let stoch = calculate_stochastic(&highs, &lows, &closes);

        let rows: Vec<AnnotatedBar> = series
            .bars()
            .iter()
            .enumerate()
            .map(|(i, bar)| AnnotatedBar {
                bar: *bar,
                indicators: IndicatorSnapshot {
                    ema21: ema21[i],
                    ema55: ema55[i],
                    ema144: ema144[i],
                    macd: macd.macd[i],
                    macd_signal: macd.signal[i],
                    stoch_k: stoch.k[i],
                    stoch_d: stoch.d[i],
                },
            })
            .collect();

        let frame = IndicatorFrame { rows };
        let snapshot = frame.snapshot();
        debug!(
            bars = frame.len(),
            complete = snapshot.is_complete(),
            missing = ?snapshot.missing_fields(),
            "indicator frame computed"
        );

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::series_from_closes;

    fn rising(n: usize) -> PriceSeries {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        series_from_closes(&closes)
    }

    #[test]
    fn frame_length_matches_series() {
        let series = rising(30);
        let frame = IndicatorEngine::compute(&series);
        assert_eq!(frame.len(), 30);
        assert_eq!(frame.rows()[29].bar, *series.latest());
    }

    #[test]
    fn warmup_marks_each_field_separately() {
        let frame = IndicatorEngine::compute(&rising(150));
        let rows = frame.rows();

        assert!(rows[EMA_FAST_SPAN - 2].indicators.ema21.is_none());
        assert!(rows[EMA_FAST_SPAN - 1].indicators.ema21.is_some());
        assert!(rows[EMA_MID_SPAN - 2].indicators.ema55.is_none());
        assert!(rows[EMA_MID_SPAN - 1].indicators.ema55.is_some());
        assert!(rows[EMA_SLOW_SPAN - 2].indicators.ema144.is_none());
        assert!(rows[EMA_SLOW_SPAN - 1].indicators.ema144.is_some());
        assert!(rows[7].indicators.stoch_k.is_none());
        assert!(rows[8].indicators.stoch_k.is_some());
    }

    #[test]
    fn short_series_reports_missing_ema144() {
        let frame = IndicatorEngine::compute(&rising(125));
        let snap = frame.snapshot();
        assert!(!snap.is_complete());
        assert_eq!(snap.missing_fields(), vec!["ema144"]);

        match snap.require_complete() {
            Err(AdvisorError::NotEnoughData { missing }) => assert_eq!(missing, vec!["ema144"]),
            other => panic!("expected NotEnoughData, got {other:?}"),
        }
    }

    #[test]
    fn long_series_is_complete() {
        let snap = IndicatorEngine::compute(&rising(200)).snapshot();
        assert!(snap.is_complete());
        assert!(snap.require_complete().is_ok());
    }

    #[test]
    fn single_bar_series_is_all_missing() {
        let snap = IndicatorEngine::compute(&rising(1)).snapshot();
        assert_eq!(snap.missing_fields().len(), 7);
    }

    #[test]
    fn rising_series_stacks_emas() {
        let snap = IndicatorEngine::compute(&rising(200)).snapshot();
        let (e21, e55, e144) = (snap.ema21.unwrap(), snap.ema55.unwrap(), snap.ema144.unwrap());
        assert!(e144 < e55 && e55 < e21);
    }
}
