//! Service request endpoint handlers.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use domain::models::{
    AssignTechnicianRequest, CreateServiceRequestRequest, ListHistoryResponse,
    ListServiceRequestsResponse, ReopenRequest, Role, ServiceRequestResponse,
    UpdateServiceRequestRequest,
};
use domain::services::parse_target;
use persistence::repositories::ServiceRequestRepository;
use shared::validation::{normalize_optional_text, parse_positive_id};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentActor;
use crate::services::{LifecycleOutcome, LifecycleService};

/// Parses a path identifier, rejecting anything but a positive integer.
fn parse_path_id(raw: &str, field: &str) -> Result<i64, ApiError> {
    parse_positive_id(raw)
        .ok_or_else(|| ApiError::invalid_field(field, format!("Invalid {}: {}", field, raw)))
}

/// Decodes a JSON body. A missing or blank body yields `None`.
///
/// Malformed JSON is reported against the `body` field rather than as an
/// extractor rejection, so every 400 carries the same error shape.
fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> Result<Option<T>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| ApiError::invalid_field("body", format!("Invalid JSON body: {}", e)))
}

fn lifecycle_service(state: &AppState) -> LifecycleService {
    LifecycleService::new(state.pool.clone(), state.state_column.clone())
}

fn request_repository(state: &AppState) -> ServiceRequestRepository {
    ServiceRequestRepository::new(state.pool.clone(), state.state_column.clone())
}

fn outcome_response(outcome: LifecycleOutcome, changed: &str) -> Json<ServiceRequestResponse> {
    let message = if outcome.plan.is_noop() {
        "No changes applied"
    } else {
        changed
    };
    Json(ServiceRequestResponse {
        message: message.to_string(),
        request: outcome.request,
    })
}

/// Update state and/or technician of a request.
///
/// PUT /api/requests/:id
///
/// An empty body is a no-op.
pub async fn update_request(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    CurrentActor(actor): CurrentActor,
    body: Bytes,
) -> Result<Json<ServiceRequestResponse>, ApiError> {
    let request_id = parse_path_id(&raw_id, "id")?;
    let request: UpdateServiceRequestRequest = parse_json_body(&body)?.unwrap_or_default();
    let proposed = request.into_proposed()?;

    let outcome = lifecycle_service(&state)
        .update(&actor, request_id, proposed)
        .await?;

    if !outcome.plan.is_noop() {
        info!(
            request_id,
            actor_id = actor.id,
            from = %outcome.plan.previous_state,
            state = %outcome.plan.resulting_state(),
            technician_changed = outcome.plan.changes.technician_id.is_some(),
            "Service request updated"
        );
    }

    Ok(outcome_response(outcome, "Service request updated"))
}

/// Push a request to a technician.
///
/// PATCH|PUT /api/requests/:id/assign-to-technician
pub async fn assign_to_technician(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    CurrentActor(actor): CurrentActor,
    body: Bytes,
) -> Result<Json<ServiceRequestResponse>, ApiError> {
    let request_id = parse_path_id(&raw_id, "id")?;
    let request: AssignTechnicianRequest = parse_json_body(&body)?.unwrap_or_default();
    let technician_id = request.technician_id()?;

    let outcome = lifecycle_service(&state)
        .send_to_technician(&actor, request_id, technician_id)
        .await?;

    info!(
        request_id,
        actor_id = actor.id,
        technician_id,
        state = %outcome.plan.resulting_state(),
        "Service request sent to technician"
    );

    Ok(outcome_response(outcome, "Service request assigned to technician"))
}

/// Reopen a completed request.
///
/// POST /api/requests/:id/reopen
///
/// The body is optional; an empty body reopens into `in_progress`.
pub async fn reopen_request(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    CurrentActor(actor): CurrentActor,
    body: Bytes,
) -> Result<Json<ServiceRequestResponse>, ApiError> {
    let request_id = parse_path_id(&raw_id, "id")?;

    let request: ReopenRequest = parse_json_body(&body)?.unwrap_or_default();
    request.validate()?;

    let target = parse_target(request.target_state.as_deref())?;
    let comment = normalize_optional_text(request.comment.as_deref());

    let outcome = lifecycle_service(&state)
        .reopen(&actor, request_id, target, comment)
        .await?;

    info!(
        request_id,
        actor_id = actor.id,
        state = %target,
        "Service request reopened"
    );

    Ok(outcome_response(outcome, "Service request reopened"))
}

/// State-change history of a request, newest first.
///
/// GET /api/requests/:id/history
pub async fn get_history(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ListHistoryResponse>, ApiError> {
    let request_id = parse_path_id(&raw_id, "id")?;
    let history = lifecycle_service(&state).history(request_id).await?;

    Ok(Json(ListHistoryResponse {
        request_id,
        history,
    }))
}

/// File a new service request.
///
/// POST /api/requests
pub async fn create_request(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    body: Bytes,
) -> Result<(StatusCode, Json<ServiceRequestResponse>), ApiError> {
    let request: CreateServiceRequestRequest = parse_json_body(&body)?
        .ok_or_else(|| ApiError::invalid_field("body", "Request body is required"))?;
    request.validate()?;

    let client_id = match actor.role {
        Role::Client => Some(actor.id),
        Role::Administrator | Role::Technician => request.client_id,
    };
    if let Some(id) = client_id {
        if id <= 0 {
            return Err(ApiError::invalid_field(
                "clientId",
                "clientId must be a positive integer",
            ));
        }
    }

    let repo = request_repository(&state);
    let created = repo.create(&request.into_new(client_id)).await?;
    let details = repo
        .find_with_details(created.id)
        .await?
        .ok_or_else(|| ApiError::Internal("Created request could not be read back".into()))?;

    info!(
        request_id = created.id,
        actor_id = actor.id,
        client_id = ?client_id,
        "Service request created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ServiceRequestResponse {
            message: "Service request created".to_string(),
            request: details,
        }),
    ))
}

/// Fetch one request with display data.
///
/// GET /api/requests/:id
pub async fn get_request(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ServiceRequestResponse>, ApiError> {
    let request_id = parse_path_id(&raw_id, "id")?;
    let details = request_repository(&state)
        .find_with_details(request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Service request not found".to_string()))?;

    Ok(Json(ServiceRequestResponse {
        message: "Service request found".to_string(),
        request: details,
    }))
}

/// Every request, newest first.
///
/// GET /api/requests
pub async fn list_requests(
    State(state): State<AppState>,
) -> Result<Json<ListServiceRequestsResponse>, ApiError> {
    let requests = request_repository(&state).list_all_with_details().await?;
    Ok(Json(ListServiceRequestsResponse { requests }))
}

/// Requests filed by one client. Clients may only list their own.
///
/// GET /api/requests/client/:client_id
pub async fn list_client_requests(
    State(state): State<AppState>,
    Path(raw_client_id): Path<String>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<ListServiceRequestsResponse>, ApiError> {
    let client_id = parse_path_id(&raw_client_id, "clientId")?;

    let allowed = match actor.role {
        Role::Administrator => true,
        Role::Client => actor.id == client_id,
        Role::Technician => false,
    };
    if !allowed {
        return Err(ApiError::Forbidden(
            "You can only list your own service requests".to_string(),
        ));
    }

    let requests = request_repository(&state).list_by_client(client_id).await?;
    Ok(Json(ListServiceRequestsResponse { requests }))
}

/// Requests assigned to the calling technician.
///
/// GET /api/requests/assigned (alias /api/requests/mine)
pub async fn list_assigned_requests(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<ListServiceRequestsResponse>, ApiError> {
    let requests = request_repository(&state)
        .list_by_technician(actor.id)
        .await?;
    Ok(Json(ListServiceRequestsResponse { requests }))
}
