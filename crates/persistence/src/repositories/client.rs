//! Client repository for database operations.

use domain::models::ClientSummary;
use sqlx::PgPool;

use crate::entities::ClientEntity;
use crate::metrics::QueryTimer;

/// Repository for client lookups.
#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    /// Creates a new ClientRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every client, most recently registered first.
    pub async fn list_all(&self) -> Result<Vec<ClientSummary>, sqlx::Error> {
        let timer = QueryTimer::new("list_clients");
        let result = sqlx::query_as::<_, ClientEntity>(
            r#"
            SELECT id, name, email, phone, created_at
            FROM clients
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.into_iter().map(ClientSummary::from).collect())
    }
}
