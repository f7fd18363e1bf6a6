//! User repository for database operations.

use domain::models::{Role, TechnicianSummary};
use sqlx::PgPool;

use crate::entities::UserEntity;
use crate::metrics::QueryTimer;

/// Repository for staff user lookups.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, email, role, active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Find an active technician account by ID.
    ///
    /// Administrators and deactivated technicians are not assignable.
    pub async fn find_active_technician(
        &self,
        id: i64,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        Ok(self
            .find_by_id(id)
            .await?
            .filter(UserEntity::is_active_technician))
    }

    /// Active technicians, by name.
    pub async fn list_active_technicians(&self) -> Result<Vec<TechnicianSummary>, sqlx::Error> {
        let timer = QueryTimer::new("list_active_technicians");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, email, role, active, created_at, updated_at
            FROM users
            WHERE role = $1 AND active
            ORDER BY name, id
            "#,
        )
        .bind(Role::Technician.as_str())
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.into_iter().map(TechnicianSummary::from).collect())
    }
}
