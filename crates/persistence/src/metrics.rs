//! Database metrics: query latency, query failures and pool occupancy.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record database query duration.
pub fn record_query_duration(query_name: &'static str, duration_secs: f64) {
    histogram!("database_query_duration_seconds", "query" => query_name).record(duration_secs);
}

/// Record database connection pool gauges.
///
/// Sampled on every health probe.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times one database round trip and records it on completion.
///
/// ```ignore
/// let timer = QueryTimer::new("find_service_request_by_id");
/// let result = sqlx::query_as::<_, ServiceRequestEntity>(...).fetch_optional(&pool).await;
/// timer.finish(&result);
/// result
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Records the elapsed time, and counts the failure if the query errored.
    pub fn finish<T>(self, result: &Result<T, sqlx::Error>) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
        if let Err(e) = result {
            counter!(
                "database_query_errors_total",
                "query" => self.query_name,
                "kind" => error_kind(e)
            )
            .increment(1);
        }
    }
}

/// Coarse error class used as a metric label.
fn error_kind(error: &sqlx::Error) -> &'static str {
    match error {
        sqlx::Error::RowNotFound => "row_not_found",
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => "pool",
        sqlx::Error::Database(_) => "database",
        sqlx::Error::Decode(_) | sqlx::Error::ColumnDecode { .. } => "decode",
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => "connection",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_keeps_name() {
        let timer = QueryTimer::new("lock_service_request_for_update");
        assert_eq!(timer.query_name, "lock_service_request_for_update");
    }

    #[test]
    fn test_finish_without_recorder() {
        let ok: Result<u64, sqlx::Error> = Ok(1);
        QueryTimer::new("update_service_request_fields").finish(&ok);
        let failed: Result<u64, sqlx::Error> = Err(sqlx::Error::PoolTimedOut);
        QueryTimer::new("update_service_request_fields").finish(&failed);
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(error_kind(&sqlx::Error::RowNotFound), "row_not_found");
        assert_eq!(error_kind(&sqlx::Error::PoolTimedOut), "pool");
        assert_eq!(error_kind(&sqlx::Error::Decode("bad state".into())), "decode");
        assert_eq!(error_kind(&sqlx::Error::WorkerCrashed), "other");
    }
}
