/// Health check endpoint
///
/// `GET /health` — liveness plus a database ping. Returns 200 with
/// `"database": "up"` when the pool answers, 200 with `"down"` when it
/// doesn't (the process is alive either way; orchestrators decide what
/// to do with a degraded report).

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use verto_shared::db::pool as db_pool;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

/// Reports service and database health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match db_pool::health_check(&state.db).await {
        Ok(()) => "up",
        Err(e) => {
            tracing::warn!(error = %e, "database health check failed");
            "down"
        }
    };

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}
