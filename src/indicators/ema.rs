// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// Formula:
//   alpha  = 2 / (span + 1)
//   EMA_t  = x_t * alpha + EMA_{t-1} * (1 - alpha)
//
// Seeding: the first defined point sits at index `span - 1` and equals the SMA
// of the first `span` inputs.  Every earlier point is `None`.  This only moves
// warm-up values; the tail converges to the same curve as a first-value seed.
// =============================================================================

/// Compute the EMA of `values` for the given `span`.
///
/// The output always has the same length as the input.  Index `i` is `None`
/// while `i < span - 1`.
///
/// # Edge cases
/// - `span == 0` => every point `None`
/// - `values.len() < span` => every point `None`
/// - A non-finite intermediate value ends the defined run; later points stay
///   `None`.
pub fn calculate_ema(values: &[f64], span: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if span == 0 || values.len() < span {
        return out;
    }

    let alpha = 2.0 / (span as f64 + 1.0);

    let seed = values[..span].iter().sum::<f64>() / span as f64;
    if !seed.is_finite() {
        return out;
    }
    out[span - 1] = Some(seed);

    let mut prev = seed;
    for (i, &x) in values.iter().enumerate().skip(span) {
        let ema = x * alpha + prev * (1.0 - alpha);
        if !ema.is_finite() {
            break;
        }
        out[i] = Some(ema);
        prev = ema;
    }

    out
}

/// EMA over a series that is itself undefined during its own warm-up (e.g.
/// the MACD line).  The EMA is seeded from the first `span` *defined* points
/// and the leading `None`s are carried through.
///
/// The defined part of `values` must be contiguous; a `None` after the first
/// defined point ends the output run.
pub fn calculate_ema_of_defined(values: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    let Some(start) = values.iter().position(Option::is_some) else {
        return out;
    };

    let tail: Vec<f64> = values[start..].iter().map_while(|v| *v).collect();
    for (offset, v) in calculate_ema(&tail, span).into_iter().enumerate() {
        out[start + offset] = v;
    }
    out
}

/// Latest defined value of an indicator series, if the final bar is defined.
pub fn last_defined(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten()
}
