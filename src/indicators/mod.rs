// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator series.  Every function returns a vector of
// the same length as its input, with `None` marking points whose trailing
// window is not yet available (or is numerically undefined), so callers are
// forced to handle warm-up and edge cases.

pub mod ema;
pub mod macd;
pub mod stochastic;
