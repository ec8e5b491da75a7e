// =============================================================================
// Stochastic Oscillator (%K 9, %D 3)
// =============================================================================
//
// %K_t = (close_t - lowest_low_9) / (highest_high_9 - lowest_low_9) * 100
// %D_t = SMA(3) of %K
//
// Both windows include bar t.  A window whose high equals its low has no
// range, so %K is undefined there (and so is every %D that touches it).
// =============================================================================

pub const K_WINDOW: usize = 9;
pub const D_WINDOW: usize = 3;

/// Full-length %K and %D series.
#[derive(Debug, Clone)]
pub struct StochasticSeries {
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
}

/// Compute %K over `window` bars.  `highs`, `lows` and `closes` must be the
/// same length; the output matches that length.
pub fn calculate_percent_k(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    window: usize,
) -> Vec<Option<f64>> {
    let n = closes.len().min(highs.len()).min(lows.len());
    let mut out = vec![None; closes.len()];
    if window == 0 || n < window {
        return out;
    }

    for t in (window - 1)..n {
        let from = t + 1 - window;
        let lowest = lows[from..=t].iter().copied().fold(f64::INFINITY, f64::min);
        let highest = highs[from..=t].iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let range = highest - lowest;
        // Flat window: no range to place the close in.
        if range <= 0.0 || !range.is_finite() {
            continue;
        }

        let k = (closes[t] - lowest) / range * 100.0;
        if k.is_finite() {
            out[t] = Some(k);
        }
    }

    out
}

/// Simple moving average over the trailing `window` points.  A point is
/// defined only when every value in its window is defined.
pub fn trailing_sma(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    for t in (window - 1)..values.len() {
        let slice = &values[t + 1 - window..=t];
        let sum: Option<f64> = slice.iter().copied().sum();
        out[t] = sum.map(|s| s / window as f64);
    }

    out
}

/// Compute %K(9) and %D(3).
pub fn calculate_stochastic(highs: &[f64], lows: &[f64], closes: &[f64]) -> StochasticSeries {
    let k = calculate_percent_k(highs, lows, closes, K_WINDOW);
    let d = trailing_sma(&k, D_WINDOW);
    StochasticSeries { k, d }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warmup_boundaries() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let highs: Vec<f64> = closes.iter().map(|c| c + 1.0).collect();
        let lows: Vec<f64> = closes.iter().map(|c| c - 1.0).collect();
        let s = calculate_stochastic(&highs, &lows, &closes);

        assert_eq!(s.k.len(), 20);
        assert_eq!(s.d.len(), 20);
        assert!(s.k[K_WINDOW - 2].is_none());
        assert!(s.k[K_WINDOW - 1].is_some());
        assert!(s.d[K_WINDOW + D_WINDOW - 3].is_none());
        assert!(s.d[K_WINDOW + D_WINDOW - 2].is_some());
    }

    #[test]
    fn known_value() {
        // window lows 1..9 -> min 1, highs 3..11 -> max 11, close 10
        let closes: Vec<f64> = (2..=10).map(|x| x as f64).collect();
        let highs: Vec<f64> = closes.iter().map(|c| c + 1.0).collect();
        let lows: Vec<f64> = closes.iter().map(|c| c - 1.0).collect();
        let k = calculate_percent_k(&highs, &lows, &closes, 9);
        assert!((k[8].unwrap() - 90.0).abs() < 1e-10);
    }

    #[test]
    fn flat_window_is_undefined_not_a_fault() {
        let flat = vec![42.0; 12];
        let s = calculate_stochastic(&flat, &flat, &flat);
        assert!(s.k.iter().all(Option::is_none));
        assert!(s.d.iter().all(Option::is_none));
    }

    #[test]
    fn k_stays_within_bounds() {
        let closes = [
            44.3, 44.1, 44.2, 43.6, 44.3, 44.8, 45.1, 45.4, 45.8, 46.1, 45.9, 46.0, 44.2, 44.2,
        ];
        let highs: Vec<f64> = closes.iter().map(|c| c + 0.5).collect();
        let lows: Vec<f64> = closes.iter().map(|c| c - 0.5).collect();
        let s = calculate_stochastic(&highs, &lows, &closes);
        for v in s.k.iter().flatten().chain(s.d.iter().flatten()) {
            assert!((0.0..=100.0).contains(v), "{v} out of range");
        }
    }

    #[test]
    fn trailing_sma_needs_every_point() {
        let values = vec![Some(1.0), None, Some(3.0), Some(5.0), Some(7.0)];
        let sma = trailing_sma(&values, 3);
        assert_eq!(sma[2], None);
        assert_eq!(sma[3], None);
        assert!((sma[4].unwrap() - 5.0).abs() < 1e-10);
    }
}
