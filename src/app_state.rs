// =============================================================================
// Application State — shared by the API handlers
// =============================================================================
//
// Holds the collaborators around the evaluation core: configuration, the
// admin token, the market data provider (with its series cache), the trade
// log sink, and a bounded history of served evaluations.
//
// Thread safety:
//   - Configuration and admin token are fixed at construction.
//   - parking_lot::RwLock for mutable collections.
//   - Atomic counter for served evaluations.
//   - The trade log sink manages its own interior mutability.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::evaluation::EvaluationEnvelope;
use crate::market_data::MarketDataProvider;
use crate::runtime_config::RuntimeConfig;
use crate::trade_log::TradeLogSink;

/// Maximum number of recent evaluations to retain.
const MAX_RECENT_EVALUATIONS: usize = 100;

pub struct AppState {
    pub config: RuntimeConfig,
    /// Bearer token for mutating endpoints.  `None` rejects them all.
    pub admin_token: Option<String>,
    pub provider: MarketDataProvider,
    pub trade_log: Arc<dyn TradeLogSink>,
    pub recent_evaluations: RwLock<Vec<EvaluationEnvelope>>,
    pub evaluations_served: AtomicU64,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(
        config: RuntimeConfig,
        provider: MarketDataProvider,
        trade_log: Arc<dyn TradeLogSink>,
    ) -> Self {
        Self {
            config,
            admin_token: None,
            provider,
            trade_log,
            recent_evaluations: RwLock::new(Vec::with_capacity(MAX_RECENT_EVALUATIONS)),
            evaluations_served: AtomicU64::new(0),
            start_time: std::time::Instant::now(),
        }
    }

    /// Accept `token` on authenticated endpoints.  Blank tokens are ignored.
    pub fn with_admin_token(mut self, token: Option<String>) -> Self {
        self.admin_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Record a served evaluation, keeping only the newest
    /// `MAX_RECENT_EVALUATIONS`.
    pub fn push_evaluation(&self, envelope: EvaluationEnvelope) {
        let mut recent = self.recent_evaluations.write();
        recent.push(envelope);
        if recent.len() > MAX_RECENT_EVALUATIONS {
            let excess = recent.len() - MAX_RECENT_EVALUATIONS;
            recent.drain(..excess);
        }
        self.evaluations_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn evaluations_served(&self) -> u64 {
        self.evaluations_served.load(Ordering::Relaxed)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::evaluation::{evaluate, EvaluationInput};
    use crate::market_data::YahooChartClient;
    use crate::strategy::Strategy;
    use crate::trade_log::MemoryTradeLog;
    use crate::types::test_support::series_from_closes;

    fn state() -> AppState {
        let client = YahooChartClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        AppState::new(
            RuntimeConfig::default(),
            MarketDataProvider::new(client),
            Arc::new(MemoryTradeLog::new()),
        )
    }

    #[test]
    fn recent_evaluations_are_bounded() {
        let state = state();
        let series = series_from_closes(&[10.0, 11.0, 12.0]);
        for _ in 0..(MAX_RECENT_EVALUATIONS + 5) {
            let eval = evaluate(&EvaluationInput {
                series: &series,
                entry_price: 10.0,
                stop_price: 9.0,
                current_price: 12.0,
                strategy: Strategy::SingleAction,
                sizing: None,
            });
            state.push_evaluation(EvaluationEnvelope::new("TEST", eval));
        }
        assert_eq!(state.recent_evaluations.read().len(), MAX_RECENT_EVALUATIONS);
        assert_eq!(state.evaluations_served(), (MAX_RECENT_EVALUATIONS + 5) as u64);
    }

    #[test]
    fn blank_admin_token_is_unset() {
        assert!(state().admin_token.is_none());
        assert!(state().with_admin_token(Some("  ".into())).admin_token.is_none());
        assert_eq!(
            state().with_admin_token(Some("s3cret".into())).admin_token.as_deref(),
            Some("s3cret")
        );
    }
}
