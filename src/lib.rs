// =============================================================================
// Trend-R Advisor — daily trend-following advisor
// =============================================================================
//
// Computes EMA(21/55/144), MACD(12,26,9) and Stochastic(9,3) over a daily
// price series, reduces the latest bar to trend/momentum flags, derives
// R-multiple price levels from an entry and stop, and turns both into a
// recommendation under one of two strategies.
//
// The evaluation core (`indicators` .. `evaluation`) is pure.  Fetching,
// caching, journaling and the HTTP surface sit around it.
// =============================================================================

pub mod api;
pub mod app_state;
pub mod error;
pub mod evaluation;
pub mod indicator_engine;
pub mod indicators;
pub mod market_data;
pub mod risk;
pub mod runtime_config;
pub mod signal_flags;
pub mod strategy;
pub mod trade_log;
pub mod types;

pub use error::AdvisorError;
pub use evaluation::{evaluate, Evaluation, EvaluationEnvelope, EvaluationInput};
pub use indicator_engine::{IndicatorEngine, IndicatorFrame, IndicatorSnapshot};
pub use risk::{PositionSize, RiskLevels, SizingParams};
pub use signal_flags::SignalFlags;
pub use strategy::{Action, Advisory, Recommendation, Strategy};
pub use types::{PriceBar, PriceSeries};
