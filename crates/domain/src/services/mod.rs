//! Lifecycle decision services.
//!
//! Each service inspects a snapshot of a request and returns an
//! [`UpdatePlan`]; persisting it is left to the caller.

pub mod assignment;
pub mod lifecycle;
pub mod reopen;

pub use assignment::{send_to_technician, ASSIGNED_COMMENT};
pub use lifecycle::{apply_update, FieldChanges, UpdatePlan, DEFAULT_CANCEL_COMMENT};
pub use reopen::{parse_target, reopen, DEFAULT_REOPEN_COMMENT, DEFAULT_REOPEN_TARGET};
