//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use persistence::{db, metrics::record_pool_metrics, repositories::ServiceRequestRepository};
use serde::Serialize;
use tracing::warn;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: DatabaseHealth,
}

/// Database health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseHealth {
    pub connected: bool,
    pub latency_ms: Option<u64>,
    /// Column holding the request state in this deployment's schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_column: Option<String>,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

impl HealthResponse {
    fn new(latency_ms: Option<u64>, state_column: Option<String>) -> Self {
        let connected = latency_ms.is_some();
        Self {
            status: if connected { "healthy" } else { "unhealthy" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: DatabaseHealth {
                connected,
                latency_ms,
                state_column,
            },
        }
    }
}

/// Full health check endpoint.
///
/// GET /api/health
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    record_pool_metrics(&state.pool);

    let latency_ms = match db::ping(&state.pool).await {
        Ok(elapsed) => Some(elapsed.as_millis() as u64),
        Err(e) => {
            warn!(error = %e, "Database ping failed");
            None
        }
    };

    if latency_ms.is_none() {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let state_column = ServiceRequestRepository::new(state.pool.clone(), state.state_column.clone())
        .state_column()
        .await
        .map(|column| column.as_str().to_string())
        .ok();

    Ok(Json(HealthResponse::new(latency_ms, state_column)))
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 OK if the service can accept traffic (database connected).
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    match db::ping(&state.pool).await {
        Ok(_) => Ok(Json(StatusResponse {
            status: "ready".to_string(),
        })),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}
