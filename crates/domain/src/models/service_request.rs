//! Service request domain model and API payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use shared::validation::{normalize_optional_text, parse_positive_id, validate_not_blank};
use validator::Validate;

use super::state::RequestState;
use crate::errors::LifecycleError;

/// Kind of job the client is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    #[serde(alias = "instalacion")]
    Installation,
    #[serde(alias = "mantenimiento")]
    Maintenance,
    #[serde(alias = "reparacion")]
    Repair,
    #[serde(alias = "asesoria")]
    Consulting,
}

impl Default for ServiceType {
    fn default() -> Self {
        ServiceType::Installation
    }
}

/// Urgency assigned at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[serde(alias = "baja")]
    Low,
    #[serde(alias = "media")]
    Medium,
    #[serde(alias = "alta")]
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// One client-submitted service job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub id: i64,
    pub client_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub service_address: String,
    pub comuna: String,
    pub region: String,
    pub service_type: ServiceType,
    pub priority: Priority,
    pub requested_equipment: Option<String>,
    pub final_comments: Option<String>,
    pub state: RequestState,
    pub technician_id: Option<i64>,
    pub submitted_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// A service request joined with client and technician display data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestDetails {
    #[serde(flatten)]
    pub request: ServiceRequest,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub technician_name: Option<String>,
}

/// Request payload for filing a new service request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequestRequest {
    /// Only honoured for administrators; clients always file for themselves.
    #[serde(default)]
    pub client_id: Option<i64>,

    #[validate(length(max = 200, message = "Title cannot exceed 200 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub description: String,

    #[validate(length(max = 500, message = "Service address cannot exceed 500 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub service_address: String,

    #[validate(length(max = 50, message = "Comuna cannot exceed 50 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub comuna: String,

    #[validate(length(max = 50, message = "Region cannot exceed 50 characters"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub region: String,

    #[serde(default)]
    pub service_type: ServiceType,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Requested equipment cannot exceed 2000 characters"))]
    pub requested_equipment: Option<String>,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Final comments cannot exceed 2000 characters"))]
    pub final_comments: Option<String>,
}

/// Trimmed input for inserting a new request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewServiceRequest {
    pub client_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub service_address: String,
    pub comuna: String,
    pub region: String,
    pub service_type: ServiceType,
    pub priority: Priority,
    pub requested_equipment: Option<String>,
    pub final_comments: Option<String>,
}

impl CreateServiceRequestRequest {
    /// Trims text fields and binds the request to `client_id`.
    pub fn into_new(self, client_id: Option<i64>) -> NewServiceRequest {
        NewServiceRequest {
            client_id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            service_address: self.service_address.trim().to_string(),
            comuna: self.comuna.trim().to_string(),
            region: self.region.trim().to_string(),
            service_type: self.service_type,
            priority: self.priority,
            requested_equipment: normalize_optional_text(self.requested_equipment.as_deref()),
            final_comments: normalize_optional_text(self.final_comments.as_deref()),
        }
    }
}

/// Keeps an explicit JSON `null` distinguishable from an absent key.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// Technician reference change requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechnicianChange {
    Assign(i64),
    Unassign,
}

impl TechnicianChange {
    pub fn as_option(&self) -> Option<i64> {
        match self {
            TechnicianChange::Assign(id) => Some(*id),
            TechnicianChange::Unassign => None,
        }
    }
}

/// Parses a technician id given as a number or an integer string.
fn parse_technician_id(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().filter(|id| *id > 0),
        serde_json::Value::String(s) => parse_positive_id(s),
        _ => None,
    }
}

fn invalid_technician() -> LifecycleError {
    LifecycleError::InvalidInput {
        field: "technicianId",
        message: "technicianId must be a positive integer".to_string(),
    }
}

/// Reads an optional text field, rejecting non-string JSON values.
///
/// `null` counts as absent. Length is measured in characters.
fn text_field(
    value: Option<&serde_json::Value>,
    field: &'static str,
    max: usize,
) -> Result<Option<String>, LifecycleError> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.chars().count() > max => {
            Err(LifecycleError::InvalidInput {
                field,
                message: format!("{} cannot exceed {} characters", field, max),
            })
        }
        Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(LifecycleError::InvalidInput {
            field,
            message: format!("{} must be a string", field),
        }),
    }
}

/// Request payload for the generic update endpoint.
///
/// Every field is optional; a body touching nothing is a valid no-op. Fields
/// are kept as raw JSON so type errors can be reported per field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequestRequest {
    #[serde(default)]
    pub state: Option<serde_json::Value>,

    /// Wins over `state` when both are sent.
    #[serde(default)]
    pub current_state: Option<serde_json::Value>,

    #[serde(default)]
    pub comment: Option<serde_json::Value>,

    #[serde(default, deserialize_with = "deserialize_present")]
    pub technician_id: Option<serde_json::Value>,
}

/// Normalized form of an update request, ready for the lifecycle engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposedChange {
    pub state: Option<RequestState>,
    pub technician: Option<TechnicianChange>,
    pub comment: Option<String>,
}

impl UpdateServiceRequestRequest {
    /// Normalizes the raw payload.
    pub fn into_proposed(self) -> Result<ProposedChange, LifecycleError> {
        let current_state = text_field(self.current_state.as_ref(), "currentState", 30)?;
        let (state_field, raw_state) = match current_state {
            Some(raw) => ("currentState", Some(raw)),
            None => ("state", text_field(self.state.as_ref(), "state", 30)?),
        };
        let state = match raw_state {
            Some(raw) => Some(RequestState::parse_input(&raw).map_err(|e| {
                LifecycleError::InvalidInput {
                    field: state_field,
                    message: e.to_string(),
                }
            })?),
            None => None,
        };

        let comment = text_field(self.comment.as_ref(), "comment", 1000)?;

        let technician = match self.technician_id {
            None => None,
            Some(serde_json::Value::Null) => Some(TechnicianChange::Unassign),
            Some(serde_json::Value::String(ref s)) if s.trim().is_empty() => {
                Some(TechnicianChange::Unassign)
            }
            Some(ref value) => Some(TechnicianChange::Assign(
                parse_technician_id(value).ok_or_else(invalid_technician)?,
            )),
        };

        Ok(ProposedChange {
            state,
            technician,
            comment: normalize_optional_text(comment.as_deref()),
        })
    }
}

/// Request payload for pushing a request to a technician.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTechnicianRequest {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub technician_id: Option<serde_json::Value>,
}

impl AssignTechnicianRequest {
    /// Returns the technician id, which is mandatory here.
    pub fn technician_id(&self) -> Result<i64, LifecycleError> {
        self.technician_id
            .as_ref()
            .and_then(parse_technician_id)
            .ok_or_else(invalid_technician)
    }
}

/// Request payload for reopening a completed request.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReopenRequest {
    #[serde(default)]
    #[validate(length(max = 30, message = "Target state cannot exceed 30 characters"))]
    pub target_state: Option<String>,

    #[serde(default)]
    #[validate(length(max = 1000, message = "Comment cannot exceed 1000 characters"))]
    pub comment: Option<String>,
}

/// Response wrapping a single refreshed request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestResponse {
    pub message: String,
    pub request: ServiceRequestDetails,
}

/// Response for request listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListServiceRequestsResponse {
    pub requests: Vec<ServiceRequestDetails>,
}
