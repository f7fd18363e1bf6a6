//! Request history entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{HistoryEntry, RequestState, UnknownState};
use sqlx::FromRow;

/// Database row mapping for the request_history table, with the actor's name joined.
#[derive(Debug, Clone, FromRow)]
pub struct HistoryEntity {
    pub id: i64,
    pub request_id: i64,
    pub state: String,
    pub comment: Option<String>,
    pub actor_id: Option<i64>,
    pub actor_name: Option<String>,
    pub changed_at: DateTime<Utc>,
}

impl TryFrom<HistoryEntity> for HistoryEntry {
    type Error = UnknownState;

    fn try_from(entity: HistoryEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            request_id: entity.request_id,
            state: RequestState::from_stored(&entity.state)?,
            comment: entity.comment,
            actor_id: entity.actor_id,
            actor_name: entity.actor_name,
            changed_at: entity.changed_at,
        })
    }
}
