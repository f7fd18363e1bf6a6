//! Transactional execution of lifecycle decisions.
//!
//! Each mutating operation locks the request row, lets the domain decide on
//! that snapshot, then writes the update and its history entry in the same
//! transaction. A rejection rolls back without writing anything.

use chrono::{DateTime, Utc};
use domain::errors::LifecycleError;
use domain::models::{
    Actor, HistoryEntry, ProposedChange, RequestState, ServiceRequest, ServiceRequestDetails,
    TechnicianChange,
};
use domain::services::{self as decisions, UpdatePlan};
use persistence::repositories::{
    HistoryRepository, ServiceRequestRepository, StateColumnCell, UserRepository,
};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::middleware::metrics::{record_lifecycle_rejection, record_state_transition};

/// Errors from lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleServiceError {
    #[error("Service request not found")]
    RequestNotFound,

    #[error("Technician {0} is not an active technician")]
    UnknownTechnician(i64),

    #[error(transparent)]
    Rejected(#[from] LifecycleError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<LifecycleServiceError> for ApiError {
    fn from(err: LifecycleServiceError) -> Self {
        match err {
            LifecycleServiceError::RequestNotFound => {
                ApiError::NotFound("Service request not found".to_string())
            }
            LifecycleServiceError::UnknownTechnician(id) => ApiError::invalid_field(
                "technicianId",
                format!("Technician {} does not exist or is inactive", id),
            ),
            LifecycleServiceError::Rejected(e) => e.into(),
            LifecycleServiceError::Database(e) => e.into(),
        }
    }
}

/// Result of an applied (or no-op) lifecycle operation.
#[derive(Debug, Clone)]
pub struct LifecycleOutcome {
    pub plan: UpdatePlan,
    /// The request as it stands after commit.
    pub request: ServiceRequestDetails,
}

/// Runs lifecycle decisions against the database.
#[derive(Clone)]
pub struct LifecycleService {
    pool: PgPool,
    requests: ServiceRequestRepository,
    history: HistoryRepository,
    users: UserRepository,
}

impl LifecycleService {
    pub fn new(pool: PgPool, state_column: StateColumnCell) -> Self {
        Self {
            requests: ServiceRequestRepository::new(pool.clone(), state_column),
            history: HistoryRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }

    /// Generic update of state and/or technician.
    pub async fn update(
        &self,
        actor: &Actor,
        request_id: i64,
        proposed: ProposedChange,
    ) -> Result<LifecycleOutcome, LifecycleServiceError> {
        if let Some(TechnicianChange::Assign(technician_id)) = proposed.technician {
            self.ensure_active_technician(technician_id).await?;
        }

        self.execute(request_id, |current, now| {
            decisions::apply_update(actor, current, proposed, now)
        })
        .await
    }

    /// Administrator push to a technician.
    pub async fn send_to_technician(
        &self,
        actor: &Actor,
        request_id: i64,
        technician_id: i64,
    ) -> Result<LifecycleOutcome, LifecycleServiceError> {
        self.ensure_active_technician(technician_id).await?;

        self.execute(request_id, |current, now| {
            decisions::send_to_technician(actor, current, technician_id, now)
        })
        .await
    }

    /// Reopen of a completed request.
    pub async fn reopen(
        &self,
        actor: &Actor,
        request_id: i64,
        target: RequestState,
        comment: Option<String>,
    ) -> Result<LifecycleOutcome, LifecycleServiceError> {
        self.execute(request_id, |current, now| {
            decisions::reopen(actor, current, target, comment, now)
        })
        .await
    }

    /// History of a request, newest first.
    pub async fn history(
        &self,
        request_id: i64,
    ) -> Result<Vec<HistoryEntry>, LifecycleServiceError> {
        if self.requests.find_by_id(request_id).await?.is_none() {
            return Err(LifecycleServiceError::RequestNotFound);
        }
        Ok(self.history.list_for_request(request_id).await?)
    }

    async fn ensure_active_technician(
        &self,
        technician_id: i64,
    ) -> Result<(), LifecycleServiceError> {
        match self.users.find_active_technician(technician_id).await? {
            Some(_) => Ok(()),
            None => {
                warn!(technician_id, "Rejected assignment to unknown technician");
                record_lifecycle_rejection("invalid-input");
                Err(LifecycleServiceError::UnknownTechnician(technician_id))
            }
        }
    }

    async fn execute<F>(
        &self,
        request_id: i64,
        decide: F,
    ) -> Result<LifecycleOutcome, LifecycleServiceError>
    where
        F: FnOnce(&ServiceRequest, DateTime<Utc>) -> Result<UpdatePlan, LifecycleError>,
    {
        let mut tx = self.pool.begin().await?;

        let current = self
            .requests
            .lock_for_update(&mut tx, request_id)
            .await?
            .ok_or(LifecycleServiceError::RequestNotFound)?;

        let plan = match decide(&current, Utc::now()) {
            Ok(plan) => plan,
            Err(e) => {
                if e.is_forbidden() {
                    warn!(
                        request_id,
                        state = %current.state,
                        reason = e.reason(),
                        "Forbidden lifecycle change"
                    );
                } else {
                    info!(
                        request_id,
                        state = %current.state,
                        reason = e.reason(),
                        "Lifecycle change rejected"
                    );
                }
                record_lifecycle_rejection(e.reason());
                return Err(e.into());
            }
        };

        if plan.is_noop() {
            tx.rollback().await?;
        } else {
            self.requests
                .update_fields(&mut tx, request_id, &plan.changes)
                .await?;
            if let Some(entry) = &plan.history {
                self.history.insert(&mut tx, entry).await?;
            }
            tx.commit().await?;

            if let Some(to) = plan.changes.state {
                record_state_transition(plan.previous_state, to);
            }
        }

        let request = self
            .requests
            .find_with_details(request_id)
            .await?
            .ok_or(LifecycleServiceError::RequestNotFound)?;

        Ok(LifecycleOutcome { plan, request })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use domain::models::Role;

    #[test]
    fn test_error_mapping() {
        let cases = [
            (LifecycleServiceError::RequestNotFound, StatusCode::NOT_FOUND),
            (
                LifecycleServiceError::UnknownTechnician(99),
                StatusCode::BAD_REQUEST,
            ),
            (
                LifecycleServiceError::Rejected(LifecycleError::ForbiddenCompleted),
                StatusCode::FORBIDDEN,
            ),
            (
                LifecycleServiceError::Rejected(LifecycleError::ForbiddenRole(Role::Client)),
                StatusCode::FORBIDDEN,
            ),
            (
                LifecycleServiceError::Rejected(LifecycleError::NotCompleted),
                StatusCode::CONFLICT,
            ),
            (
                LifecycleServiceError::Database(sqlx::Error::PoolTimedOut),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            let api: ApiError = error.into();
            assert_eq!(api.into_response().status(), status);
        }
    }
}
