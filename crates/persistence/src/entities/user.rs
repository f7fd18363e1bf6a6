//! Staff user entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Role, TechnicianSummary};
use sqlx::FromRow;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserEntity {
    /// Parsed role, `None` if the stored value is not recognized.
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }

    pub fn is_active_technician(&self) -> bool {
        self.active && self.role() == Some(Role::Technician)
    }
}

impl From<UserEntity> for TechnicianSummary {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
        }
    }
}
