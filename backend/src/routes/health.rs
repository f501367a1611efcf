//! Health check endpoints
//!
//! - /health - Basic health check
//! - /health/ready - Readiness probe (runs a query against the user store)
//! - /health/live - Liveness probe (always OK while the process serves)

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<HealthChecks>,
}

/// Individual health checks
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: CheckStatus,
}

/// Status of an individual check
#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Open connections in the pool
    pub connections: u32,
    /// Idle connections in the pool
    pub idle: usize,
}

fn version_response(status: &str) -> HealthResponse {
    HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
    }
}

/// Basic health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(version_response("healthy"))
}

/// Readiness probe - checks if the user store answers queries
/// Returns 503 if it does not
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let pool = state.db();
    let (status, message) = match db::health_check(pool).await {
        Ok(_) => ("healthy", None),
        Err(e) => ("unhealthy", Some(e.to_string())),
    };
    let is_healthy = message.is_none();

    let response = HealthResponse {
        checks: Some(HealthChecks {
            database: CheckStatus {
                status: status.to_string(),
                message,
                connections: pool.size(),
                idle: pool.num_idle(),
            },
        }),
        ..version_response(if is_healthy { "ready" } else { "not_ready" })
    };

    if is_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Liveness probe - checks if the service is alive
pub async fn liveness_check() -> Json<HealthResponse> {
    Json(version_response("alive"))
}
