// =============================================================================
// Signal Flags — boolean trend / momentum verdicts for the latest bar
// =============================================================================
//
//   trend_ok = EMA144 < EMA55 < EMA21   (strict uptrend stack)
//   macd_ok  = MACD > signal
//   kdj_ok   = %K > %D
//
// Flags are only derived from a complete snapshot.  An incomplete snapshot is
// a `NotEnoughData` condition, never a `false` flag.
//
// `kdj_ok` is reported but neither decision strategy reads it.
// =============================================================================

use serde::Serialize;

use crate::error::AdvisorError;
use crate::indicator_engine::IndicatorSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignalFlags {
    pub trend_ok: bool,
    pub macd_ok: bool,
    pub kdj_ok: bool,
}

impl SignalFlags {
    /// Derive the flags from a snapshot.
    ///
    /// # Errors
    /// `NotEnoughData` listing the undefined fields when the snapshot is not
    /// complete.
    pub fn from_snapshot(snapshot: &IndicatorSnapshot) -> Result<Self, AdvisorError> {
        let (
            Some(ema21),
            Some(ema55),
            Some(ema144),
            Some(macd),
            Some(macd_signal),
            Some(k),
            Some(d),
        ) = (
            snapshot.ema21,
            snapshot.ema55,
            snapshot.ema144,
            snapshot.macd,
            snapshot.macd_signal,
            snapshot.stoch_k,
            snapshot.stoch_d,
        )
        else {
            return Err(snapshot.not_enough_data());
        };

        Ok(Self {
            trend_ok: ema144 < ema55 && ema55 < ema21,
            macd_ok: macd > macd_signal,
            kdj_ok: k > d,
        })
    }

    /// Single-action status line.
    pub fn trend_status(&self) -> &'static str {
        if self.trend_ok {
            "TREND OK"
        } else {
            "NO TRADE"
        }
    }

    /// Per-indicator labels for the advisory breakdown.
    pub fn labels(&self) -> SignalLabels {
        SignalLabels {
            trend: if self.trend_ok { "OK" } else { "Weak" },
            macd: if self.macd_ok { "Golden" } else { "Negative" },
            kdj: if self.kdj_ok { "Golden" } else { "Negative" },
        }
    }
}

/// Display labels for the three flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignalLabels {
    pub trend: &'static str,
    pub macd: &'static str,
    pub kdj: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn snapshot(ema21: f64, ema55: f64, ema144: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            ema21: Some(ema21),
            ema55: Some(ema55),
            ema144: Some(ema144),
            macd: Some(1.0),
            macd_signal: Some(0.5),
            stoch_k: Some(40.0),
            stoch_d: Some(60.0),
        }
    }

    #[test]
    fn uptrend_stack() {
        let flags = SignalFlags::from_snapshot(&snapshot(110.0, 105.0, 100.0)).unwrap();
        assert!(flags.trend_ok);
        assert!(flags.macd_ok);
        assert!(!flags.kdj_ok);
    }

    #[test]
    fn equal_emas_are_not_a_trend() {
        let flags = SignalFlags::from_snapshot(&snapshot(100.0, 100.0, 99.0)).unwrap();
        assert!(!flags.trend_ok);
    }

    #[test]
    fn incomplete_snapshot_is_not_enough_data() {
        let mut snap = snapshot(110.0, 105.0, 100.0);
        snap.ema144 = None;
        snap.stoch_d = None;
        match SignalFlags::from_snapshot(&snap) {
            Err(AdvisorError::NotEnoughData { missing }) => {
                assert_eq!(missing, vec!["ema144", "stoch_d"]);
            }
            other => panic!("expected NotEnoughData, got {other:?}"),
        }
    }

    #[test]
    fn flag_error_matches_snapshot_report() {
        let mut snap = snapshot(110.0, 105.0, 100.0);
        snap.macd_signal = None;
        assert_eq!(
            SignalFlags::from_snapshot(&snap).unwrap_err(),
            snap.require_complete().unwrap_err()
        );
    }

    #[test]
    fn labels_follow_flags() {
        let flags = SignalFlags {
            trend_ok: false,
            macd_ok: true,
            kdj_ok: false,
        };
        assert_eq!(flags.trend_status(), "NO TRADE");
        let labels = flags.labels();
        assert_eq!(labels.trend, "Weak");
        assert_eq!(labels.macd, "Golden");
        assert_eq!(labels.kdj, "Negative");
    }

    #[quickcheck]
    fn trend_ok_iff_strict_stack(a: f64, b: f64, c: f64) -> bool {
        if !(a.is_finite() && b.is_finite() && c.is_finite()) {
            return true;
        }
        let flags = SignalFlags::from_snapshot(&snapshot(a, b, c)).unwrap();
        flags.trend_ok == (c < b && b < a)
    }
}
