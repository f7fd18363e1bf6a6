//! Domain error types.

use thiserror::Error;

use crate::models::actor::Role;

/// Why a lifecycle operation was refused.
///
/// Every variant is decided before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("Invalid {field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },

    #[error("Only administrators can reopen a completed request")]
    ForbiddenReopen,

    #[error("Technicians cannot modify a completed request")]
    ForbiddenCompleted,

    #[error("Role {0} is not allowed to perform this operation")]
    ForbiddenRole(Role),

    #[error("Request is not completed")]
    NotCompleted,
}

impl LifecycleError {
    /// Stable machine-readable tag for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            LifecycleError::InvalidInput { .. } => "invalid-input",
            LifecycleError::ForbiddenReopen => "forbidden-reopen",
            LifecycleError::ForbiddenCompleted => "forbidden-completed",
            LifecycleError::ForbiddenRole(_) => "forbidden-role",
            LifecycleError::NotCompleted => "conflict",
        }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(
            self,
            LifecycleError::ForbiddenReopen
                | LifecycleError::ForbiddenCompleted
                | LifecycleError::ForbiddenRole(_)
        )
    }
}
