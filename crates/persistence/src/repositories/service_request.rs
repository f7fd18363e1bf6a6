//! Service request repository for database operations.

use domain::models::{
    DailyCount, NewServiceRequest, RequestState, Role, ServiceRequest, ServiceRequestDetails,
    StateTotals, TechnicianPerformance,
};
use domain::services::FieldChanges;
use sqlx::{PgConnection, PgPool};

use crate::entities::{
    DailyCountEntity, PriorityDb, ServiceRequestDetailsEntity, ServiceRequestEntity,
    ServiceTypeDb, StateCountEntity, TechnicianPerformanceEntity,
};
use crate::metrics::QueryTimer;

use super::state_column::{resolve_state_column, StateColumn, StateColumnCell};

/// Selected columns of `service_requests` aliased `sr`, state exposed as `state`.
fn request_columns(column: StateColumn) -> String {
    format!(
        "sr.id, sr.client_id, sr.title, sr.description, sr.service_address, sr.comuna, \
         sr.region, sr.service_type, sr.priority, sr.requested_equipment, sr.final_comments, \
         sr.{} AS state, sr.technician_id, sr.submitted_at, sr.assigned_at, sr.closed_at, \
         sr.updated_at",
        column.as_str()
    )
}

/// Joined select for request listings with display names.
fn details_select(column: StateColumn) -> String {
    format!(
        r#"
        SELECT {}, c.name AS client_name, c.email AS client_email, u.name AS technician_name
        FROM service_requests sr
        LEFT JOIN clients c ON c.id = sr.client_id
        LEFT JOIN users u ON u.id = sr.technician_id
        "#,
        request_columns(column)
    )
}

fn decode_request(entity: ServiceRequestEntity) -> Result<ServiceRequest, sqlx::Error> {
    entity
        .into_domain()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn decode_details(
    entities: Vec<ServiceRequestDetailsEntity>,
) -> Result<Vec<ServiceRequestDetails>, sqlx::Error> {
    entities
        .into_iter()
        .map(|e| e.into_domain().map_err(|e| sqlx::Error::Decode(Box::new(e))))
        .collect()
}

/// Repository for service request database operations.
///
/// Reads hand back domain models; the stored state spelling never leaves here.
#[derive(Clone)]
pub struct ServiceRequestRepository {
    pool: PgPool,
    state_column: StateColumnCell,
}

impl ServiceRequestRepository {
    /// Creates a new ServiceRequestRepository sharing the process-wide column memo.
    pub fn new(pool: PgPool, state_column: StateColumnCell) -> Self {
        Self { pool, state_column }
    }

    /// Resolved state column, looked up on first use.
    pub async fn state_column(&self) -> Result<StateColumn, sqlx::Error> {
        self.state_column
            .get_or_try_init(|| resolve_state_column(&self.pool))
            .await
            .copied()
    }

    /// Insert a new request in the `pending` state.
    pub async fn create(&self, new: &NewServiceRequest) -> Result<ServiceRequest, sqlx::Error> {
        let column = self.state_column().await?;
        let sql = format!(
            r#"
            INSERT INTO service_requests AS sr (
                client_id, title, description, service_address, comuna, region,
                service_type, priority, requested_equipment, final_comments, {}
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            column.as_str(),
            request_columns(column)
        );

        let timer = QueryTimer::new("create_service_request");
        let result = sqlx::query_as::<_, ServiceRequestEntity>(&sql)
            .bind(new.client_id)
            .bind(&new.title)
            .bind(&new.description)
            .bind(&new.service_address)
            .bind(&new.comuna)
            .bind(&new.region)
            .bind(ServiceTypeDb::from(new.service_type))
            .bind(PriorityDb::from(new.priority))
            .bind(&new.requested_equipment)
            .bind(&new.final_comments)
            .bind(RequestState::Pending.as_stored())
            .fetch_one(&self.pool)
            .await;
        timer.finish(&result);
        decode_request(result?)
    }

    /// Find a request by ID.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<ServiceRequest>, sqlx::Error> {
        let column = self.state_column().await?;
        let sql = format!(
            "SELECT {} FROM service_requests sr WHERE sr.id = $1",
            request_columns(column)
        );

        let timer = QueryTimer::new("find_service_request_by_id");
        let result = sqlx::query_as::<_, ServiceRequestEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.finish(&result);
        result?.map(decode_request).transpose()
    }

    /// Find a request by ID with client and technician display data.
    pub async fn find_with_details(
        &self,
        id: i64,
    ) -> Result<Option<ServiceRequestDetails>, sqlx::Error> {
        let column = self.state_column().await?;
        let sql = format!("{} WHERE sr.id = $1", details_select(column));

        let timer = QueryTimer::new("find_service_request_with_details");
        let result = sqlx::query_as::<_, ServiceRequestDetailsEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.finish(&result);
        result?
            .map(|e| e.into_domain().map_err(|e| sqlx::Error::Decode(Box::new(e))))
            .transpose()
    }

    /// List requests filed by a client, newest first.
    pub async fn list_by_client(
        &self,
        client_id: i64,
    ) -> Result<Vec<ServiceRequestDetails>, sqlx::Error> {
        let column = self.state_column().await?;
        let sql = format!(
            "{} WHERE sr.client_id = $1 ORDER BY sr.submitted_at DESC, sr.id DESC",
            details_select(column)
        );

        let timer = QueryTimer::new("list_service_requests_by_client");
        let result = sqlx::query_as::<_, ServiceRequestDetailsEntity>(&sql)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await;
        timer.finish(&result);
        decode_details(result?)
    }

    /// List every request, newest first.
    pub async fn list_all_with_details(&self) -> Result<Vec<ServiceRequestDetails>, sqlx::Error> {
        let column = self.state_column().await?;
        let sql = format!(
            "{} ORDER BY sr.submitted_at DESC, sr.id DESC",
            details_select(column)
        );

        let timer = QueryTimer::new("list_all_service_requests");
        let result = sqlx::query_as::<_, ServiceRequestDetailsEntity>(&sql)
            .fetch_all(&self.pool)
            .await;
        timer.finish(&result);
        decode_details(result?)
    }

    /// List requests assigned to a technician, most recently assigned first.
    pub async fn list_by_technician(
        &self,
        technician_id: i64,
    ) -> Result<Vec<ServiceRequestDetails>, sqlx::Error> {
        let column = self.state_column().await?;
        let sql = format!(
            "{} WHERE sr.technician_id = $1 \
             ORDER BY sr.assigned_at DESC NULLS LAST, sr.id DESC",
            details_select(column)
        );

        let timer = QueryTimer::new("list_service_requests_by_technician");
        let result = sqlx::query_as::<_, ServiceRequestDetailsEntity>(&sql)
            .bind(technician_id)
            .fetch_all(&self.pool)
            .await;
        timer.finish(&result);
        decode_details(result?)
    }

    /// The most recently submitted requests.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<ServiceRequestDetails>, sqlx::Error> {
        let column = self.state_column().await?;
        let sql = format!(
            "{} ORDER BY sr.submitted_at DESC, sr.id DESC LIMIT $1",
            details_select(column)
        );

        let timer = QueryTimer::new("list_recent_service_requests");
        let result = sqlx::query_as::<_, ServiceRequestDetailsEntity>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await;
        timer.finish(&result);
        decode_details(result?)
    }

    /// Request counts per canonical state.
    ///
    /// Grouping happens on the stored spelling; both spellings of a state
    /// fold into one bucket.
    pub async fn state_totals(&self) -> Result<StateTotals, sqlx::Error> {
        let column = self.state_column().await?;
        let sql = format!(
            "SELECT {col} AS state, COUNT(*) AS total FROM service_requests GROUP BY {col}",
            col = column.as_str()
        );

        let timer = QueryTimer::new("count_service_requests_by_state");
        let result = sqlx::query_as::<_, StateCountEntity>(&sql)
            .fetch_all(&self.pool)
            .await;
        timer.finish(&result);

        let counts = result?
            .into_iter()
            .map(|row| {
                RequestState::from_stored(&row.state)
                    .map(|state| (state, row.total))
                    .map_err(|e| sqlx::Error::Decode(Box::new(e)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StateTotals::from_counts(counts))
    }

    /// Requests submitted per UTC day over the last `days` days, oldest first.
    pub async fn daily_counts(&self, days: i32) -> Result<Vec<DailyCount>, sqlx::Error> {
        let timer = QueryTimer::new("count_service_requests_by_day");
        let result = sqlx::query_as::<_, DailyCountEntity>(
            r#"
            SELECT (submitted_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS total
            FROM service_requests
            WHERE submitted_at >= NOW() - make_interval(days => $1)
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(days)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.into_iter().map(DailyCount::from).collect())
    }

    /// Workload per active technician, busiest finishers first.
    pub async fn technician_performance(
        &self,
    ) -> Result<Vec<TechnicianPerformance>, sqlx::Error> {
        let column = self.state_column().await?;
        let sql = format!(
            r#"
            SELECT u.id AS technician_id, u.name, u.email,
                   COUNT(sr.id) AS assigned_total,
                   COUNT(sr.id) FILTER (WHERE sr.{col} IN ($2, $3)) AS in_progress,
                   COUNT(sr.id) FILTER (WHERE sr.{col} = $4) AS completed,
                   COUNT(sr.id) FILTER (WHERE sr.{col} = $5) AS cancelled,
                   (AVG(EXTRACT(EPOCH FROM (sr.closed_at - sr.assigned_at)))
                       FILTER (WHERE sr.{col} = $4 AND sr.assigned_at IS NOT NULL)
                       / 3600.0)::float8 AS avg_completion_hours
            FROM users u
            LEFT JOIN service_requests sr ON sr.technician_id = u.id
            WHERE u.role = $1 AND u.active
            GROUP BY u.id, u.name, u.email
            ORDER BY completed DESC, u.name, u.id
            "#,
            col = column.as_str()
        );

        let timer = QueryTimer::new("technician_performance");
        let result = sqlx::query_as::<_, TechnicianPerformanceEntity>(&sql)
            .bind(Role::Technician.as_str())
            .bind(RequestState::InProgress.as_stored())
            .bind(RequestState::InProgress.as_str())
            .bind(RequestState::Completed.as_stored())
            .bind(RequestState::Cancelled.as_stored())
            .fetch_all(&self.pool)
            .await;
        timer.finish(&result);
        Ok(result?
            .into_iter()
            .map(TechnicianPerformance::from)
            .collect())
    }

    /// Read a request and lock its row until the surrounding transaction ends.
    pub async fn lock_for_update(
        &self,
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Option<ServiceRequest>, sqlx::Error> {
        let column = self.state_column().await?;
        let sql = format!(
            "SELECT {} FROM service_requests sr WHERE sr.id = $1 FOR UPDATE",
            request_columns(column)
        );

        let timer = QueryTimer::new("lock_service_request_for_update");
        let result = sqlx::query_as::<_, ServiceRequestEntity>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await;
        timer.finish(&result);
        result?.map(decode_request).transpose()
    }

    /// Apply a set of column deltas in one UPDATE.
    ///
    /// Returns the number of rows touched; an empty delta touches nothing.
    pub async fn update_fields(
        &self,
        conn: &mut PgConnection,
        id: i64,
        changes: &FieldChanges,
    ) -> Result<u64, sqlx::Error> {
        if changes.is_empty() {
            return Ok(0);
        }
        let column = self.state_column().await?;

        let mut sets = Vec::new();
        let mut param_count = 1;

        if changes.state.is_some() {
            param_count += 1;
            sets.push(format!("{} = ${}", column.as_str(), param_count));
        }
        if changes.technician_id.is_some() {
            param_count += 1;
            sets.push(format!("technician_id = ${}", param_count));
        }
        if changes.assigned_at.is_some() {
            param_count += 1;
            sets.push(format!("assigned_at = ${}", param_count));
        }
        if changes.closed_at.is_some() {
            param_count += 1;
            sets.push(format!("closed_at = ${}", param_count));
        }
        if changes.updated_at.is_some() {
            param_count += 1;
            sets.push(format!("updated_at = ${}", param_count));
        }

        let sql = format!(
            "UPDATE service_requests SET {} WHERE id = $1",
            sets.join(", ")
        );
        let mut query = sqlx::query(&sql).bind(id);

        if let Some(state) = changes.state {
            query = query.bind(state.as_stored());
        }
        if let Some(technician_id) = changes.technician_id {
            query = query.bind(technician_id);
        }
        if let Some(assigned_at) = changes.assigned_at {
            query = query.bind(assigned_at);
        }
        if let Some(closed_at) = changes.closed_at {
            query = query.bind(closed_at);
        }
        if let Some(updated_at) = changes.updated_at {
            query = query.bind(updated_at);
        }

        let timer = QueryTimer::new("update_service_request_fields");
        let result = query.execute(&mut *conn).await;
        timer.finish(&result);
        Ok(result?.rows_affected())
    }
}
