//! State-change history (audit trail) models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::state::RequestState;

/// Immutable record of one state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    pub request_id: i64,
    pub state: RequestState,
    pub comment: Option<String>,
    /// None for system actions
    pub actor_id: Option<i64>,
    pub actor_name: Option<String>,
    pub changed_at: DateTime<Utc>,
}

/// A history row waiting to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryEntry {
    pub request_id: i64,
    pub state: RequestState,
    pub comment: Option<String>,
    pub actor_id: Option<i64>,
}

/// Response for the history listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListHistoryResponse {
    pub request_id: i64,
    pub history: Vec<HistoryEntry>,
}
