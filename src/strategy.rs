// =============================================================================
// Decision Strategies — R levels + signal flags -> recommendation
// =============================================================================
//
// Two independent rule sets, selected explicitly by the caller:
//
//   SingleAction  one verdict, first match wins
//     1. levels invalid         -> Incomplete
//     2. flags unavailable      -> NotEnoughData
//     3. !trend_ok              -> NoTrade
//     4. price >= R3            -> ReduceOrTakeProfit
//     5. price >= R2            -> MoveStopToBreakeven
//     6. price >= R1            -> AddPosition
//     7. otherwise              -> Wait
//
//   Advisory      every applicable line, in this order
//     price >= R1 && trend_ok && macd_ok  -> AddPositionAllowed
//     price >= R2                         -> MoveStopToBreakeven
//     price >= R3                         -> ConsiderTrailingStopOrPartialExit
//     !trend_ok || !macd_ok               -> TrendWeakeningAvoidAdding
//
// SingleAction gates on trend alone; Advisory also needs MACD for its add
// line.  The two are kept separate on purpose.  Neither reads kdj_ok.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::risk::RiskLevels;
use crate::signal_flags::SignalFlags;

// =============================================================================
// Strategy selector
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    SingleAction,
    Advisory,
}

impl Default for Strategy {
    fn default() -> Self {
        Self::SingleAction
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SingleAction => write!(f, "single_action"),
            Self::Advisory => write!(f, "advisory"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single_action" | "single" | "a" | "mobile" => Ok(Self::SingleAction),
            "advisory" | "b" | "desktop" => Ok(Self::Advisory),
            other => Err(format!(
                "unknown strategy '{other}'. Use 'single_action' or 'advisory'."
            )),
        }
    }
}

// =============================================================================
// Outputs
// =============================================================================

/// Verdict of the single-action strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Incomplete,
    NotEnoughData,
    NoTrade,
    ReduceOrTakeProfit,
    MoveStopToBreakeven,
    AddPosition,
    Wait,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Incomplete => "ENTER ENTRY AND STOP",
            Self::NotEnoughData => "NOT ENOUGH DATA",
            Self::NoTrade => "NO TRADE",
            Self::ReduceOrTakeProfit => "REDUCE / TAKE PROFIT",
            Self::MoveStopToBreakeven => "MOVE STOP TO BREAKEVEN",
            Self::AddPosition => "ADD POSITION",
            Self::Wait => "WAIT",
        }
    }
}

/// One line of the advisory report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    AddPositionAllowed,
    MoveStopToBreakeven,
    ConsiderTrailingStopOrPartialExit,
    TrendWeakeningAvoidAdding,
}

impl Advisory {
    pub fn message(&self) -> &'static str {
        match self {
            Self::AddPositionAllowed => "Price >= 1R: Add position allowed",
            Self::MoveStopToBreakeven => "Price >= 2R: Move stop loss to breakeven",
            Self::ConsiderTrailingStopOrPartialExit => {
                "Price >= 3R: Consider trailing stop or partial exit"
            }
            Self::TrendWeakeningAvoidAdding => {
                "Trend weakening: avoid adding, consider reducing position"
            }
        }
    }
}

/// Strategy output: a single verdict or a (possibly empty) advisory report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Recommendation {
    SingleAction { action: Action },
    Advisory { advisories: Vec<Advisory> },
}

impl Recommendation {
    /// Human-readable lines for the presentation layer.
    pub fn lines(&self) -> Vec<&'static str> {
        match self {
            Self::SingleAction { action } => vec![action.label()],
            Self::Advisory { advisories } => advisories.iter().map(Advisory::message).collect(),
        }
    }
}

// =============================================================================
// Rules
// =============================================================================

impl Strategy {
    /// Apply this strategy.  `flags` is `None` when the snapshot was
    /// incomplete; `levels` is `None` when the entry/stop pair was invalid.
    pub fn decide(
        &self,
        flags: Option<&SignalFlags>,
        levels: Option<&RiskLevels>,
        current_price: f64,
    ) -> Recommendation {
        let rec = match self {
            Self::SingleAction => Recommendation::SingleAction {
                action: single_action(flags, levels, current_price),
            },
            Self::Advisory => {
                let advisories = match (flags, levels) {
                    (Some(flags), Some(levels)) => advisory(flags, levels, current_price),
                    _ => Vec::new(),
                };
                Recommendation::Advisory { advisories }
            }
        };

        debug!(strategy = %self, current_price, recommendation = ?rec, "strategy decided");
        rec
    }
}

/// Precedence-ordered single verdict.
pub fn single_action(
    flags: Option<&SignalFlags>,
    levels: Option<&RiskLevels>,
    current_price: f64,
) -> Action {
    let Some(levels) = levels else {
        return Action::Incomplete;
    };
    let Some(flags) = flags else {
        return Action::NotEnoughData;
    };

    if !flags.trend_ok {
        Action::NoTrade
    } else if current_price >= levels.r3 {
        Action::ReduceOrTakeProfit
    } else if current_price >= levels.r2 {
        Action::MoveStopToBreakeven
    } else if current_price >= levels.r1 {
        Action::AddPosition
    } else {
        Action::Wait
    }
}

/// Independent, non-exclusive advisory checks.
pub fn advisory(flags: &SignalFlags, levels: &RiskLevels, current_price: f64) -> Vec<Advisory> {
    let mut out = Vec::new();

    if current_price >= levels.r1 && flags.trend_ok && flags.macd_ok {
        out.push(Advisory::AddPositionAllowed);
    }
    if current_price >= levels.r2 {
        out.push(Advisory::MoveStopToBreakeven);
    }
    if current_price >= levels.r3 {
        out.push(Advisory::ConsiderTrailingStopOrPartialExit);
    }
    if !flags.trend_ok || !flags.macd_ok {
        out.push(Advisory::TrendWeakeningAvoidAdding);
    }

    out
}
