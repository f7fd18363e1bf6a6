//! Administrator push of a request to a named technician.

use chrono::{DateTime, Utc};

use crate::errors::LifecycleError;
use crate::models::{Actor, NewHistoryEntry, RequestState, ServiceRequest};

use super::lifecycle::{FieldChanges, UpdatePlan};

/// Note recorded with every dispatch.
pub const ASSIGNED_COMMENT: &str = "Assigned by administrator";

/// Decides a dispatch of `current` to `technician_id`.
///
/// Unlike the generic update path this always stamps `assigned_at` and
/// always audits, even when the technician does not change. Intake states
/// advance to `Assigned`; every other state is kept.
pub fn send_to_technician(
    actor: &Actor,
    current: &ServiceRequest,
    technician_id: i64,
    now: DateTime<Utc>,
) -> Result<UpdatePlan, LifecycleError> {
    if !actor.is_admin() {
        return Err(LifecycleError::ForbiddenRole(actor.role));
    }
    if technician_id <= 0 {
        return Err(LifecycleError::InvalidInput {
            field: "technicianId",
            message: "technicianId must be a positive integer".to_string(),
        });
    }

    let resulting = if current.state.is_intake() {
        RequestState::Assigned
    } else {
        current.state
    };

    let changes = FieldChanges {
        state: (resulting != current.state).then_some(resulting),
        technician_id: Some(Some(technician_id)),
        assigned_at: Some(now),
        updated_at: Some(now),
        ..Default::default()
    };

    Ok(UpdatePlan {
        request_id: current.id,
        previous_state: current.state,
        changes,
        history: Some(NewHistoryEntry {
            request_id: current.id,
            state: resulting,
            comment: Some(ASSIGNED_COMMENT.to_string()),
            actor_id: Some(actor.id),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProposedChange, Role, TechnicianChange};
    use crate::services::lifecycle::apply_update;
    use crate::services::lifecycle::test_support::*;

    #[test]
    fn test_pending_request_becomes_assigned() {
        let current = request(1, RequestState::Pending);
        let plan = send_to_technician(&admin(), &current, 7, ts(10)).unwrap();

        assert_eq!(plan.changes.state, Some(RequestState::Assigned));
        assert_eq!(plan.changes.technician_id, Some(Some(7)));
        assert_eq!(plan.changes.assigned_at, Some(ts(10)));
        assert_eq!(plan.changes.updated_at, Some(ts(10)));

        let history = plan.history.unwrap();
        assert_eq!(history.state, RequestState::Assigned);
        assert_eq!(history.comment.as_deref(), Some("Assigned by administrator"));
        assert_eq!(history.actor_id, Some(1));
    }

    #[test]
    fn test_under_review_becomes_assigned() {
        let current = request(1, RequestState::UnderReview);
        let plan = send_to_technician(&admin(), &current, 7, ts(10)).unwrap();
        assert_eq!(plan.resulting_state(), RequestState::Assigned);
    }

    #[test]
    fn test_in_progress_keeps_state_but_is_audited() {
        let mut current = request(1, RequestState::InProgress);
        current.technician_id = Some(7);
        current.assigned_at = Some(ts(5));

        let plan = send_to_technician(&admin(), &current, 8, ts(30)).unwrap();
        assert_eq!(plan.changes.state, None);
        assert_eq!(plan.resulting_state(), RequestState::InProgress);
        assert_eq!(plan.changes.technician_id, Some(Some(8)));

        let history = plan.history.unwrap();
        assert_eq!(history.state, RequestState::InProgress);
        assert_eq!(history.comment.as_deref(), Some(ASSIGNED_COMMENT));
    }

    #[test]
    fn test_reassignment_refreshes_assigned_at() {
        let mut current = request(1, RequestState::Assigned);
        current.technician_id = Some(7);
        current.assigned_at = Some(ts(5));

        let plan = send_to_technician(&admin(), &current, 9, ts(40)).unwrap();
        let mut updated = current.clone();
        plan.changes.apply_to(&mut updated);
        assert_eq!(updated.assigned_at, Some(ts(40)));
        assert_eq!(updated.technician_id, Some(9));

        // the generic update path leaves the first assignment stamp alone
        let proposed = ProposedChange {
            technician: Some(TechnicianChange::Assign(9)),
            ..Default::default()
        };
        let generic = apply_update(&admin(), &current, proposed, ts(40)).unwrap();
        assert_eq!(generic.changes.assigned_at, None);
    }

    #[test]
    fn test_same_technician_still_stamps_and_audits() {
        let mut current = request(1, RequestState::Assigned);
        current.technician_id = Some(7);
        current.assigned_at = Some(ts(5));

        let plan = send_to_technician(&admin(), &current, 7, ts(40)).unwrap();
        assert!(!plan.is_noop());
        assert_eq!(plan.changes.assigned_at, Some(ts(40)));
        assert!(plan.history.is_some());
    }

    #[test]
    fn test_non_admin_rejected() {
        let current = request(1, RequestState::Pending);
        let err = send_to_technician(&technician(), &current, 7, ts(10)).unwrap_err();
        assert_eq!(err, LifecycleError::ForbiddenRole(Role::Technician));

        let client = Actor::new(50, Role::Client);
        assert!(send_to_technician(&client, &current, 7, ts(10))
            .unwrap_err()
            .is_forbidden());
    }

    #[test]
    fn test_non_positive_technician_rejected() {
        let current = request(1, RequestState::Pending);
        for id in [0, -1] {
            let err = send_to_technician(&admin(), &current, id, ts(10)).unwrap_err();
            assert_eq!(err.reason(), "invalid-input");
        }
    }
}
