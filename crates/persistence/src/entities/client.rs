//! Client entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::ClientSummary;
use sqlx::FromRow;

/// Database row mapping for the clients table.
#[derive(Debug, Clone, FromRow)]
pub struct ClientEntity {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ClientEntity> for ClientSummary {
    fn from(entity: ClientEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            phone: entity.phone,
            registered_at: entity.created_at,
        }
    }
}
