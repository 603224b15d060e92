//! Axum HTTP server: stateless endpoints for the gemcost frontend.
//!
//! Every request recomputes from scratch; nothing is cached between requests.
//! CPU-bound work runs on the blocking pool so the async workers stay free.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/run` | Calibrate one configuration and return its report |
//! | GET | `/state_value` | Optimal value of one state at a fixed price |
//! | GET | `/options` | Options on offer from a stat vector |

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::api_computations::{
    compute_option_distribution, compute_state_value, run_with_calibration, RunRequest,
};
use crate::types::{Grade, ProcessState, StatVector};

/// Server-wide settings shared by all handlers.
#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    /// Seed used for requests that do not specify one.
    pub default_seed: Option<u64>,
}

pub type AppState = Arc<ServerConfig>;

pub fn create_router(config: Arc<ServerConfig>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health_check))
        .route("/run", post(handle_run))
        .route("/state_value", get(handle_get_state_value))
        .route("/options", get(handle_get_options))
        .layer(cors)
        .with_state(config)
}

// ── Request/Response types ──────────────────────────────────────────

#[derive(Deserialize)]
struct StateValueQuery {
    grade: Grade,
    price: f64,
    attempts: u32,
    rerolls: u32,
    /// Comma-separated, e.g. `1,3,2,1`.
    stats: String,
}

#[derive(Deserialize)]
struct OptionsQuery {
    stats: String,
}

type ErrorResponse = (StatusCode, Json<serde_json::Value>);

fn error_response(status: StatusCode, msg: &str) -> ErrorResponse {
    (status, Json(serde_json::json!({ "error": msg })))
}

fn parse_stats(raw: &str) -> Result<StatVector, ErrorResponse> {
    let parsed: Result<Vec<u8>, _> = raw.split(',').map(|s| s.trim().parse::<u8>()).collect();
    let values: [u8; 4] = parsed
        .ok()
        .and_then(|v| v.try_into().ok())
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "stats must be 4 comma-separated integers"))?;
    StatVector::new(values)
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "stats must lie in [1, 5]"))
}

// ── GET handlers ────────────────────────────────────────────────────

async fn handle_health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}

async fn handle_get_state_value(
    Query(params): Query<StateValueQuery>,
) -> Result<Json<serde_json::Value>, ErrorResponse> {
    let stats = parse_stats(&params.stats)?;
    if !params.price.is_finite() {
        return Err(error_response(StatusCode::BAD_REQUEST, "price must be finite"));
    }
    let (max_attempts, base_rerolls) = params.grade.budget();
    // every attempt can grant at most +2 rerolls
    let max_rerolls = base_rerolls + 2 * max_attempts;
    if params.attempts > max_attempts || params.rerolls > max_rerolls {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "attempts or rerolls exceed what this grade can reach",
        ));
    }

    let state = ProcessState {
        attempts: params.attempts,
        rerolls: params.rerolls,
        stats,
    };
    let grade = params.grade;
    let price = params.price;
    let value = tokio::task::spawn_blocking(move || compute_state_value(grade, price, state))
        .await
        .map_err(|_| error_response(StatusCode::INTERNAL_SERVER_ERROR, "computation failed"))?;

    Ok(Json(serde_json::json!({
        "grade": grade,
        "price": price,
        "state": state,
        "value": value,
    })))
}

async fn handle_get_options(
    Query(params): Query<OptionsQuery>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let stats = parse_stats(&params.stats)?;
    let options: Vec<serde_json::Value> = compute_option_distribution(&stats)
        .into_iter()
        .map(|(opt, share)| {
            serde_json::json!({
                "option": opt.option,
                "probability": opt.probability,
                "share": share,
                "charged_cost": opt.charged_cost(),
            })
        })
        .collect();
    Ok(Json(serde_json::json!({ "stats": stats, "options": options })))
}

// ── POST handler ────────────────────────────────────────────────────

async fn handle_run(
    State(config): State<AppState>,
    Json(req): Json<RunRequest>,
) -> Result<Json<serde_json::Value>, ErrorResponse> {
    let mut params = req
        .validate()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, &e.to_string()))?;
    if params.seed.is_none() {
        params.seed = config.default_seed;
    }

    let (report, calibration) = tokio::task::spawn_blocking(move || run_with_calibration(&params))
        .await
        .map_err(|_| error_response(StatusCode::INTERNAL_SERVER_ERROR, "simulation failed"))?;

    let mut result = serde_json::to_value(report)
        .map_err(|_| error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to encode report"))?;
    result["calibration"] = serde_json::json!(calibration.history);
    Ok(Json(result))
}
