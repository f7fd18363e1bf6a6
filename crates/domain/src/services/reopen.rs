//! Reverting a completed request to a working state.

use chrono::{DateTime, Utc};

use crate::errors::LifecycleError;
use crate::models::{Actor, NewHistoryEntry, RequestState, ServiceRequest};

use super::lifecycle::{FieldChanges, UpdatePlan};

/// Note recorded when a reopen carries no comment.
pub const DEFAULT_REOPEN_COMMENT: &str = "Reopened by administrator";

/// Target used when the caller names none.
pub const DEFAULT_REOPEN_TARGET: RequestState = RequestState::InProgress;

/// States a completed request may be reopened into.
pub const REOPEN_TARGETS: [RequestState; 2] = [RequestState::Pending, RequestState::InProgress];

/// Parses the requested reopen target, defaulting to `InProgress`.
pub fn parse_target(raw: Option<&str>) -> Result<RequestState, LifecycleError> {
    let raw = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw,
        None => return Ok(DEFAULT_REOPEN_TARGET),
    };

    RequestState::parse_input(raw)
        .ok()
        .filter(|state| REOPEN_TARGETS.contains(state))
        .ok_or_else(|| LifecycleError::InvalidInput {
            field: "targetState",
            message: "targetState must be pending or in_progress".to_string(),
        })
}

/// Decides a reopen of `current`.
///
/// The caller resolves the target with [`parse_target`] first so a bad target
/// is reported even when the request does not exist.
pub fn reopen(
    actor: &Actor,
    current: &ServiceRequest,
    target: RequestState,
    comment: Option<String>,
    now: DateTime<Utc>,
) -> Result<UpdatePlan, LifecycleError> {
    if !REOPEN_TARGETS.contains(&target) {
        return Err(LifecycleError::InvalidInput {
            field: "targetState",
            message: "targetState must be pending or in_progress".to_string(),
        });
    }
    if !actor.is_admin() {
        return Err(LifecycleError::ForbiddenRole(actor.role));
    }
    if current.state != RequestState::Completed {
        return Err(LifecycleError::NotCompleted);
    }

    let changes = FieldChanges {
        state: Some(target),
        closed_at: Some(None),
        updated_at: Some(now),
        ..Default::default()
    };

    Ok(UpdatePlan {
        request_id: current.id,
        previous_state: current.state,
        changes,
        history: Some(NewHistoryEntry {
            request_id: current.id,
            state: target,
            comment: Some(comment.unwrap_or_else(|| DEFAULT_REOPEN_COMMENT.to_string())),
            actor_id: Some(actor.id),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::lifecycle::test_support::*;

    #[test]
    fn test_parse_target_defaults_to_in_progress() {
        assert_eq!(parse_target(None).unwrap(), RequestState::InProgress);
        assert_eq!(parse_target(Some("  ")).unwrap(), RequestState::InProgress);
    }

    #[test]
    fn test_parse_target_accepts_legacy_spellings() {
        assert_eq!(parse_target(Some("pending")).unwrap(), RequestState::Pending);
        assert_eq!(parse_target(Some("en_proceso")).unwrap(), RequestState::InProgress);
        assert_eq!(parse_target(Some("en_progreso")).unwrap(), RequestState::InProgress);
        assert_eq!(parse_target(Some("In Progress")).unwrap(), RequestState::InProgress);
    }

    #[test]
    fn test_parse_target_rejects_other_states() {
        for raw in ["assigned", "cancelled", "completed", "bogus"] {
            let err = parse_target(Some(raw)).unwrap_err();
            assert_eq!(err.reason(), "invalid-input", "target {}", raw);
        }
    }

    #[test]
    fn test_reopen_with_defaults() {
        let current = request(2, RequestState::Completed);
        assert!(current.closed_at.is_some());

        let plan = reopen(&admin(), &current, parse_target(None).unwrap(), None, ts(30)).unwrap();
        assert_eq!(plan.changes.state, Some(RequestState::InProgress));
        assert_eq!(plan.changes.closed_at, Some(None));
        assert_eq!(plan.changes.updated_at, Some(ts(30)));

        let history = plan.history.unwrap();
        assert_eq!(history.state, RequestState::InProgress);
        assert_eq!(history.comment.as_deref(), Some("Reopened by administrator"));

        let mut updated = current.clone();
        plan.changes.apply_to(&mut updated);
        assert_eq!(updated.closed_at, None);
        assert_eq!(updated.state, RequestState::InProgress);
    }

    #[test]
    fn test_reopen_to_pending_with_comment() {
        let current = request(2, RequestState::Completed);
        let plan = reopen(
            &admin(),
            &current,
            RequestState::Pending,
            Some("Client reported a leak".to_string()),
            ts(30),
        )
        .unwrap();
        let history = plan.history.unwrap();
        assert_eq!(history.state, RequestState::Pending);
        assert_eq!(history.comment.as_deref(), Some("Client reported a leak"));
    }

    #[test]
    fn test_reopen_requires_completed() {
        for state in [
            RequestState::Pending,
            RequestState::InProgress,
            RequestState::Cancelled,
        ] {
            let current = request(2, state);
            let err = reopen(&admin(), &current, RequestState::InProgress, None, ts(30))
                .unwrap_err();
            assert_eq!(err, LifecycleError::NotCompleted);
        }
    }

    #[test]
    fn test_reopen_requires_admin() {
        let current = request(2, RequestState::Completed);
        let err = reopen(&technician(), &current, RequestState::InProgress, None, ts(30))
            .unwrap_err();
        assert!(err.is_forbidden());
    }

    #[test]
    fn test_reopen_rejects_bad_target_first() {
        let current = request(2, RequestState::Pending);
        let err = reopen(&technician(), &current, RequestState::Assigned, None, ts(30))
            .unwrap_err();
        assert_eq!(err.reason(), "invalid-input");
    }
}
