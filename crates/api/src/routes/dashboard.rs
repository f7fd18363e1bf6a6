//! Administrator dashboard endpoint.

use axum::{extract::State, Json};
use domain::models::DashboardResponse;
use persistence::repositories::ServiceRequestRepository;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;

/// Window for the per-day submission series.
const DAILY_WINDOW_DAYS: i32 = 30;

/// Number of requests shown in the recent list.
const RECENT_LIMIT: i64 = 15;

/// Totals by state, daily submissions, technician performance and the
/// latest requests.
///
/// GET /api/metrics/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let repo = ServiceRequestRepository::new(state.pool.clone(), state.state_column.clone());

    let (totals, requests_per_day, technician_performance, recent_requests) = tokio::try_join!(
        repo.state_totals(),
        repo.daily_counts(DAILY_WINDOW_DAYS),
        repo.technician_performance(),
        repo.list_recent(RECENT_LIMIT),
    )?;

    info!(
        total = totals.total,
        open = totals.open,
        technicians = technician_performance.len(),
        "Fetched dashboard metrics"
    );

    Ok(Json(DashboardResponse {
        totals,
        requests_per_day,
        technician_performance,
        recent_requests,
    }))
}
