//! Technician and client listings for administrators.

use axum::{extract::State, Json};
use domain::models::{ListClientsResponse, ListTechniciansResponse};
use persistence::repositories::{ClientRepository, UserRepository};

use crate::app::AppState;
use crate::error::ApiError;

/// Technicians a request can be sent to.
///
/// GET /api/technicians
pub async fn list_technicians(
    State(state): State<AppState>,
) -> Result<Json<ListTechniciansResponse>, ApiError> {
    let technicians = UserRepository::new(state.pool.clone())
        .list_active_technicians()
        .await?;
    Ok(Json(ListTechniciansResponse { technicians }))
}

/// GET /api/clients
pub async fn list_clients(
    State(state): State<AppState>,
) -> Result<Json<ListClientsResponse>, ApiError> {
    let clients = ClientRepository::new(state.pool.clone()).list_all().await?;
    Ok(Json(ListClientsResponse { clients }))
}
