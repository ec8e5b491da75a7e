// =============================================================================
// Trend-R Advisor — Main Entry Point
// =============================================================================
//
// Loads configuration, wires the market data provider and trade journal into
// the shared state, and serves the JSON API until Ctrl+C.  The configuration
// file is read once and never written.
// =============================================================================

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use trend_r_advisor::api;
use trend_r_advisor::api::auth::admin_token_from_env;
use trend_r_advisor::app_state::AppState;
use trend_r_advisor::market_data::{MarketDataProvider, YahooChartClient};
use trend_r_advisor::runtime_config::RuntimeConfig;
use trend_r_advisor::trade_log::{JsonlTradeLog, MemoryTradeLog, TradeLogSink};

const CONFIG_PATH: &str = "advisor_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Trend-R Advisor starting up");

    let mut config = RuntimeConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.apply_env_overrides();

    info!(
        strategy = %config.default_strategy,
        lookback = config.lookback.as_range(),
        capital = config.capital,
        risk_pct = config.risk_pct,
        "advisor configured"
    );

    // ── 2. Market data ───────────────────────────────────────────────────
    let client = YahooChartClient::new(&config.yahoo_base_url, config.request_timeout())
        .context("failed to build market data client")?;
    let provider = MarketDataProvider::new(client);

    // ── 3. Trade journal ─────────────────────────────────────────────────
    let trade_log: Arc<dyn TradeLogSink> = match config.trade_log_path.as_deref() {
        Some(path) => {
            info!(path, "trade journal on disk");
            Arc::new(JsonlTradeLog::new(path))
        }
        None => {
            info!("trade journal in memory");
            Arc::new(MemoryTradeLog::new())
        }
    };

    // ── 4. Shared state + API server ─────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(
        AppState::new(config, provider, trade_log).with_admin_token(admin_token_from_env()),
    );
    if state.admin_token.is_none() {
        warn!("ADVISOR_ADMIN_TOKEN is not set; trade journal appends are disabled");
    }

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    let app = api::rest::router(state.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    // ── 5. Shutdown ──────────────────────────────────────────────────────
    info!(
        evaluations_served = state.evaluations_served(),
        "Trend-R Advisor shut down complete."
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received — stopping gracefully");
}
