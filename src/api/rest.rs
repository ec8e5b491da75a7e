// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// Thin JSON surface over the evaluation core.  Every endpoint lives under
// `/api/v1/`.  Only appending to the trade log requires the admin token.
//
//   GET  /api/v1/health            liveness + counters
//   POST /api/v1/evaluate          fetch a ticker's series and evaluate it
//   POST /api/v1/evaluate-series   evaluate a caller-supplied series
//   GET  /api/v1/evaluations       recent evaluations (newest last)
//   GET  /api/v1/trades            trade journal
//   POST /api/v1/trades            append to the trade journal (auth)
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use crate::api::auth::AdminToken;
use crate::app_state::AppState;
use crate::error::AdvisorError;
use crate::evaluation::{evaluate, EvaluationEnvelope, EvaluationInput};
use crate::market_data::{normalize_ticker, Lookback};
use crate::risk::SizingParams;
use crate::strategy::Strategy;
use crate::trade_log::TradeRecord;
use crate::types::{PriceBar, PriceSeries};

// =============================================================================
// Router construction
// =============================================================================

/// Build the REST router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/evaluate", post(evaluate_ticker))
        .route("/api/v1/evaluate-series", post(evaluate_series))
        .route("/api/v1/evaluations", get(recent_evaluations))
        .route("/api/v1/trades", get(list_trades).post(append_trade))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Errors
// =============================================================================

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Map a provider failure onto an HTTP status.
    fn from_provider(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<AdvisorError>() {
            Some(e) if matches!(e, AdvisorError::NoDataFound { .. }) => {
                Self::new(StatusCode::NOT_FOUND, e.to_string())
            }
            Some(e) => Self::new(StatusCode::BAD_GATEWAY, e.to_string()),
            None => Self::new(StatusCode::BAD_GATEWAY, format!("{err:#}")),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    evaluations_served: u64,
    cached_series: usize,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.uptime_secs(),
        evaluations_served: state.evaluations_served(),
        cached_series: state.provider.cache().len(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Evaluation
// =============================================================================

/// Position inputs shared by both evaluate endpoints.  Unset prices default to
/// zero, which the core treats as "not entered".
#[derive(Debug, Deserialize)]
struct PositionInputs {
    #[serde(default)]
    entry_price: f64,
    #[serde(default)]
    stop_price: f64,
    #[serde(default)]
    current_price: f64,
    #[serde(default)]
    strategy: Option<String>,
    #[serde(default)]
    capital: Option<f64>,
    #[serde(default)]
    risk_pct: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EvaluateRequest {
    ticker: String,
    #[serde(default)]
    lookback: Option<Lookback>,
    #[serde(flatten)]
    position: PositionInputs,
}

#[derive(Debug, Deserialize)]
struct EvaluateSeriesRequest {
    #[serde(default)]
    ticker: Option<String>,
    bars: Vec<PriceBar>,
    #[serde(flatten)]
    position: PositionInputs,
}

/// Evaluate `series` with the request's position inputs and record the result.
fn run_evaluation(
    state: &AppState,
    ticker: &str,
    series: &PriceSeries,
    position: &PositionInputs,
) -> Result<EvaluationEnvelope, ApiError> {
    let default_strategy = state.config.default_strategy;
    let default_sizing = state.config.sizing();

    let strategy = match position.strategy.as_deref() {
        Some(raw) => raw
            .parse::<Strategy>()
            .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e))?,
        None => default_strategy,
    };

    let sizing = SizingParams {
        capital: position.capital.unwrap_or(default_sizing.capital),
        risk_pct: position.risk_pct.unwrap_or(default_sizing.risk_pct),
    };

    let evaluation = evaluate(&EvaluationInput {
        series,
        entry_price: position.entry_price,
        stop_price: position.stop_price,
        current_price: position.current_price,
        strategy,
        sizing: Some(sizing),
    });

    let envelope = EvaluationEnvelope::new(ticker, evaluation);
    info!(
        ticker,
        strategy = %strategy,
        as_of = %envelope.evaluation.as_of,
        lines = ?envelope.evaluation.lines,
        degraded = envelope.evaluation.is_degraded(),
        "evaluation served"
    );
    state.push_evaluation(envelope.clone());
    Ok(envelope)
}

async fn evaluate_ticker(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Result<Json<EvaluationEnvelope>, ApiError> {
    let Json(req) = payload?;
    let lookback = req.lookback.unwrap_or(state.config.lookback);

    let series = state
        .provider
        .fetch_daily_series(&req.ticker, lookback)
        .await
        .map_err(|e| {
            warn!(ticker = %req.ticker, error = %format!("{e:#}"), "series fetch failed");
            ApiError::from_provider(&e)
        })?;

    let ticker = normalize_ticker(&req.ticker).unwrap_or_default();
    let envelope = run_evaluation(&state, &ticker, &series, &req.position)?;
    Ok(Json(envelope))
}

async fn evaluate_series(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EvaluateSeriesRequest>, JsonRejection>,
) -> Result<Json<EvaluationEnvelope>, ApiError> {
    let Json(req) = payload?;
    let series =
        PriceSeries::new(req.bars).map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
    let ticker = req.ticker.unwrap_or_default();

    let envelope = run_evaluation(&state, ticker.trim(), &series, &req.position)?;
    Ok(Json(envelope))
}

async fn recent_evaluations(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let recent = state.recent_evaluations.read().clone();
    Json(recent)
}

// =============================================================================
// Trade journal
// =============================================================================

#[derive(Debug, Deserialize)]
struct TradeRequest {
    entry_price: f64,
    stop_price: f64,
    current_price: f64,
}

async fn list_trades(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TradeRecord>>, ApiError> {
    state.trade_log.records().map(Json).map_err(|e| {
        error!(error = %format!("{e:#}"), "failed to read trade log");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "failed to read trade log")
    })
}

async fn append_trade(
    _auth: AdminToken,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TradeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TradeRecord>), ApiError> {
    let Json(req) = payload?;
    let record = TradeRecord::now(req.entry_price, req.stop_price, req.current_price);

    state.trade_log.append(record.clone()).map_err(|e| {
        error!(error = %format!("{e:#}"), "failed to append trade record");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "failed to append trade record")
    })?;

    info!(
        entry_price = record.entry_price,
        stop_price = record.stop_price,
        current_price = record.current_price,
        "trade record appended via API"
    );
    Ok((StatusCode::CREATED, Json(record)))
}
