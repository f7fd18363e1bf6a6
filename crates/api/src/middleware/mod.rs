//! HTTP middleware components.

pub mod actor_auth;
pub mod logging;
pub mod metrics;
pub mod rbac;
pub mod trace_id;

pub use actor_auth::require_actor;
pub use metrics::{init_metrics, metrics_handler, metrics_middleware};
pub use rbac::{require_admin, require_staff, require_technician};
pub use trace_id::{trace_id, RequestId, REQUEST_ID_HEADER};
