// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. Read endpoints are public; control
// endpoints require the admin bearer token via the `AdminAuth` extractor.
//
// CORS is configured permissively so a separately served dashboard can
// poll the API from any origin.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

use crate::api::auth::AdminAuth;
use crate::app_state::AppState;
use crate::dashboard::{asset_detail, table_view};
use crate::runtime_config::{clamp_min_score, CONFIG_PATH};
use crate::scoring::signals::{DEFAULT_INFLATION, DEFAULT_NARRATIVE, DEFAULT_WHALES_DERIV};
use crate::scoring::{COMPONENT_WEIGHTS, SCORE_RANGES, STABLECOIN_SYMBOLS, WRAPPED_SYMBOLS};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Public ──────────────────────────────────────────────────
        .route("/api/v1/health", get(health))
        .route("/api/v1/state", get(full_state))
        .route("/api/v1/scores", get(scores))
        .route("/api/v1/scores/:symbol", get(score_detail))
        .route("/api/v1/meta", get(meta))
        .route("/api/v1/ws", get(crate::api::ws::ws_handler))
        // ── Authenticated ───────────────────────────────────────────
        .route("/api/v1/control/refresh", post(control_refresh))
        .route("/api/v1/control/min-score", post(control_min_score))
        // ── Middleware & State ───────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
enum ApiError {
    /// No table has been computed yet.
    NotReady,
    UnknownSymbol(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotReady => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Scores not computed yet".to_string(),
            ),
            Self::UnknownSymbol(sym) => (
                StatusCode::NOT_FOUND,
                format!("No scored asset with symbol '{sym}'"),
            ),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[derive(Deserialize)]
struct ScoreQuery {
    #[serde(default)]
    min_score: Option<f64>,
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    scores_ready: bool,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        state_version: state.current_state_version(),
        scores_ready: state.cache.latest().is_some(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Snapshot, table and detail
// =============================================================================

async fn full_state(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ScoreQuery>,
) -> impl IntoResponse {
    Json(state.build_snapshot(q.min_score.map(clamp_min_score)))
}

async fn scores(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ScoreQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let table = state.cache.latest().ok_or(ApiError::NotReady)?;
    let min_score = q
        .min_score
        .map(clamp_min_score)
        .unwrap_or_else(|| state.runtime_config.read().default_min_score);

    let view = table_view(&table, min_score);
    debug!(
        min_score,
        passing = view.passing,
        analysed = view.analysed,
        "score table served"
    );
    Ok(Json(view))
}

async fn score_detail(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let table = state.cache.latest().ok_or(ApiError::NotReady)?;
    let asset = table
        .find_symbol(&symbol)
        .ok_or_else(|| ApiError::UnknownSymbol(symbol.clone()))?;
    Ok(Json(asset_detail(asset)))
}

// =============================================================================
// Scoring metadata (for UI labelling)
// =============================================================================

async fn meta(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (vs_currency, top_n, default_min_score) = {
        let config = state.runtime_config.read();
        (config.vs_currency.clone(), config.top_n, config.default_min_score)
    };

    Json(serde_json::json!({
        "score_ranges": SCORE_RANGES,
        "component_weights": COMPONENT_WEIGHTS,
        "placeholders": {
            "inflation": DEFAULT_INFLATION,
            "narrative": DEFAULT_NARRATIVE,
            "whales_deriv": DEFAULT_WHALES_DERIV,
        },
        "excluded_symbols": {
            "stablecoins": STABLECOIN_SYMBOLS,
            "wrapped": WRAPPED_SYMBOLS,
        },
        "vs_currency": vs_currency,
        "top_n": top_n,
        "default_min_score": default_min_score,
    }))
}

// =============================================================================
// Control endpoints (authenticated)
// =============================================================================

async fn control_refresh(
    _auth: AdminAuth,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    state.request_refresh();
    info!("manual refresh triggered via API");
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "message": "Refresh scheduled" })),
    )
}

#[derive(Deserialize)]
struct MinScoreRequest {
    min_score: f64,
}

async fn control_min_score(
    _auth: AdminAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<MinScoreRequest>,
) -> impl IntoResponse {
    let min_score = clamp_min_score(req.min_score);

    // Clone config and drop the write lock before touching the disk.
    let config = {
        let mut config = state.runtime_config.write();
        config.default_min_score = min_score;
        config.clone()
    };

    if let Err(e) = config.save(CONFIG_PATH) {
        warn!(error = %e, "Failed to save runtime config to disk");
    }
    state.increment_version();
    info!(min_score, "default min score changed via API");

    Json(serde_json::json!({ "default_min_score": min_score }))
}

// =============================================================================
// Tests
// =============================================================================
