//! Request lifecycle engine.
//!
//! Decides whether a proposed change to a service request is allowed for the
//! calling actor and, if so, which columns move and whether a history entry
//! must be appended. Pure: the caller supplies `now` and persists the plan.
//!
//! Rules, in evaluation order:
//! 1. Moving a completed request to any other state is a reopen and requires
//!    an administrator.
//! 2. Technicians cannot submit any state for a completed request, even the
//!    same one.
//! 3. Cancelling without a comment records the default cancellation note.
//!
//! Only fields that are supplied *and* differ from the persisted values
//! produce deltas. A proposal that changes nothing yields an empty plan.

use chrono::{DateTime, Utc};

use crate::errors::LifecycleError;
use crate::models::{
    Actor, NewHistoryEntry, ProposedChange, RequestState, Role, ServiceRequest,
};

/// Note recorded when a request is cancelled without a comment.
///
/// The text mentions a technician even when none is assigned; kept verbatim
/// because existing reports match on it.
pub const DEFAULT_CANCEL_COMMENT: &str = "Cancelled with technician assigned";

/// Column-level deltas for one service request.
///
/// `None` means "leave the column alone". For nullable columns the inner
/// `Option` is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldChanges {
    pub state: Option<RequestState>,
    pub technician_id: Option<Option<i64>>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub closed_at: Option<Option<DateTime<Utc>>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl FieldChanges {
    pub fn is_empty(&self) -> bool {
        self.state.is_none()
            && self.technician_id.is_none()
            && self.assigned_at.is_none()
            && self.closed_at.is_none()
            && self.updated_at.is_none()
    }

    /// Applies the deltas to an in-memory copy of the request.
    pub fn apply_to(&self, request: &mut ServiceRequest) {
        if let Some(state) = self.state {
            request.state = state;
        }
        if let Some(technician_id) = self.technician_id {
            request.technician_id = technician_id;
        }
        if let Some(assigned_at) = self.assigned_at {
            request.assigned_at = Some(assigned_at);
        }
        if let Some(closed_at) = self.closed_at {
            request.closed_at = closed_at;
        }
        if let Some(updated_at) = self.updated_at {
            request.updated_at = updated_at;
        }
    }
}

/// Outcome of an accepted lifecycle decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlan {
    pub request_id: i64,
    /// State the request was in when the decision was made.
    pub previous_state: RequestState,
    pub changes: FieldChanges,
    /// Present iff the state actually changes (or the operation always audits).
    pub history: Option<NewHistoryEntry>,
}

impl UpdatePlan {
    /// True when nothing needs to be written.
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty() && self.history.is_none()
    }

    /// The state the request ends up in.
    pub fn resulting_state(&self) -> RequestState {
        self.changes.state.unwrap_or(self.previous_state)
    }
}

/// Decides a generic update (state and/or technician) for one request.
pub fn apply_update(
    actor: &Actor,
    current: &ServiceRequest,
    proposed: ProposedChange,
    now: DateTime<Utc>,
) -> Result<UpdatePlan, LifecycleError> {
    let current_state = current.state;

    if current_state == RequestState::Completed {
        if let Some(target) = proposed.state {
            if target != RequestState::Completed && !actor.is_admin() {
                return Err(LifecycleError::ForbiddenReopen);
            }
            if actor.role == Role::Technician {
                return Err(LifecycleError::ForbiddenCompleted);
            }
        }
    }

    let new_state = proposed.state.filter(|s| *s != current_state);
    let new_technician = proposed
        .technician
        .map(|t| t.as_option())
        .filter(|t| *t != current.technician_id);

    let mut changes = FieldChanges::default();

    if let Some(state) = new_state {
        changes.state = Some(state);
        if state == RequestState::Completed {
            changes.closed_at = Some(Some(now));
        } else if current_state == RequestState::Completed {
            changes.closed_at = Some(None);
        }
    }

    if let Some(technician_id) = new_technician {
        changes.technician_id = Some(technician_id);
        if current.technician_id.is_none()
            && technician_id.is_some()
            && current.assigned_at.is_none()
        {
            changes.assigned_at = Some(now);
        }
    }

    if !changes.is_empty() {
        changes.updated_at = Some(now);
    }

    let history = new_state.map(|state| {
        let comment = match proposed.comment {
            None if state == RequestState::Cancelled => Some(DEFAULT_CANCEL_COMMENT.to_string()),
            other => other,
        };
        NewHistoryEntry {
            request_id: current.id,
            state,
            comment,
            actor_id: Some(actor.id),
        }
    });

    Ok(UpdatePlan {
        request_id: current.id,
        previous_state: current_state,
        changes,
        history,
    })
}
