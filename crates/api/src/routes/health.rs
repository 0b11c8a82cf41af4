//! Liveness and readiness endpoints, mounted at the root (not under `/api/v1`).
//!
//! `/health/live` never touches the database. `/health` answers 503 while the
//! database is unreachable so a load balancer stops routing to the instance.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

const SERVICE_NAME: &str = "datagen-api";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub database: DatabaseHealth,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub reachable: bool,
    /// Round trip of `SELECT 1`; absent when the check failed.
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// GET /health
async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let started = Instant::now();
    let database = match datagen_db::health_check(&state.pool).await {
        Ok(()) => DatabaseHealth {
            reachable: true,
            latency_ms: Some(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            DatabaseHealth {
                reachable: false,
                latency_ms: None,
            }
        }
    };

    let (status_code, status) = if database.reachable {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            database,
        }),
    )
}

/// GET /health/live
async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok",
        service: SERVICE_NAME,
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(readiness))
        .route("/health/live", get(liveness))
}
