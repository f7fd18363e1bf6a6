//! Role gating for request routes.
//!
//! Runs after [`require_actor`](super::actor_auth::require_actor), which puts
//! the [`Actor`] in request extensions.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::{Actor, Role};
use serde_json::json;

use super::actor_auth::unauthorized_response;
use super::metrics::record_lifecycle_rejection;

/// Roles allowed to work the request lifecycle.
pub const STAFF_ROLES: &[Role] = &[Role::Administrator, Role::Technician];

/// Requires an administrator.
pub async fn require_admin(req: Request<Body>, next: Next) -> Response {
    require_roles_impl(req, next, &[Role::Administrator]).await
}

/// Requires an administrator or technician.
pub async fn require_staff(req: Request<Body>, next: Next) -> Response {
    require_roles_impl(req, next, STAFF_ROLES).await
}

/// Requires a technician.
pub async fn require_technician(req: Request<Body>, next: Next) -> Response {
    require_roles_impl(req, next, &[Role::Technician]).await
}

async fn require_roles_impl(req: Request<Body>, next: Next, allowed: &[Role]) -> Response {
    let actor = match req.extensions().get::<Actor>() {
        Some(actor) => actor,
        None => {
            tracing::warn!("Role check reached without an authenticated actor");
            return unauthorized_response("Authentication required");
        }
    };

    if !actor.has_any_role(allowed) {
        tracing::info!(
            actor_id = actor.id,
            role = %actor.role,
            path = %req.uri().path(),
            "Role not allowed for route"
        );
        record_lifecycle_rejection("forbidden-role");
        return forbidden_response(&format!(
            "Role {} is not allowed to perform this operation",
            actor.role
        ));
    }

    next.run(req).await
}

fn forbidden_response(message: &str) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "forbidden",
            "message": message
        })),
    )
        .into_response()
}
