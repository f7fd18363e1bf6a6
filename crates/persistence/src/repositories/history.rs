//! Request history repository (audit log writer).
//!
//! Rows are append-only: nothing here updates or deletes them.

use domain::models::{HistoryEntry, NewHistoryEntry};
use sqlx::{PgConnection, PgPool};

use crate::entities::HistoryEntity;
use crate::metrics::QueryTimer;

/// Repository for request history database operations.
#[derive(Clone)]
pub struct HistoryRepository {
    pool: PgPool,
}

impl HistoryRepository {
    /// Creates a new HistoryRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one entry inside the caller's transaction. Returns the new row id.
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        entry: &NewHistoryEntry,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("insert_request_history");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO request_history (request_id, state, comment, actor_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(entry.request_id)
        .bind(entry.state.as_stored())
        .bind(&entry.comment)
        .bind(entry.actor_id)
        .fetch_one(&mut *conn)
        .await;
        timer.finish(&result);
        result
    }

    /// History for a request, newest first, with the actor's display name.
    pub async fn list_for_request(
        &self,
        request_id: i64,
    ) -> Result<Vec<HistoryEntry>, sqlx::Error> {
        let timer = QueryTimer::new("list_request_history");
        let result = sqlx::query_as::<_, HistoryEntity>(
            r#"
            SELECT h.id, h.request_id, h.state, h.comment, h.actor_id,
                   u.name AS actor_name, h.changed_at
            FROM request_history h
            LEFT JOIN users u ON u.id = h.actor_id
            WHERE h.request_id = $1
            ORDER BY h.changed_at DESC, h.id DESC
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);

        result?
            .into_iter()
            .map(|e| HistoryEntry::try_from(e).map_err(|e| sqlx::Error::Decode(Box::new(e))))
            .collect()
    }
}
