use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use persistence::repositories::{state_column_cell, StateColumnCell};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, require_actor, require_admin, require_staff,
    require_technician, trace_id,
};
use crate::routes::{dashboard, directory, health, requests};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// Which column holds the request state; resolved on first use.
    pub state_column: StateColumnCell,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        pool,
        config: config.clone(),
        state_column: state_column_cell(),
    };

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Middleware order: require_actor runs first (outermost), then the role check
    let admin_routes = Router::new()
        .route("/api/requests", get(requests::list_requests))
        .route(
            "/api/requests/:id/assign-to-technician",
            patch(requests::assign_to_technician).put(requests::assign_to_technician),
        )
        .route("/api/requests/:id/reopen", post(requests::reopen_request))
        .route("/api/technicians", get(directory::list_technicians))
        .route("/api/clients", get(directory::list_clients))
        .route("/api/metrics/dashboard", get(dashboard::get_dashboard))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_actor));

    let staff_routes = Router::new()
        .route(
            "/api/requests/:id",
            get(requests::get_request).put(requests::update_request),
        )
        .route("/api/requests/:id/history", get(requests::get_history))
        .route_layer(middleware::from_fn(require_staff))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_actor));

    let technician_routes = Router::new()
        .route("/api/requests/assigned", get(requests::list_assigned_requests))
        .route("/api/requests/mine", get(requests::list_assigned_requests))
        .route_layer(middleware::from_fn(require_technician))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_actor));

    // Any authenticated role; handlers scope by actor
    let authenticated_routes = Router::new()
        .route("/api/requests", post(requests::create_request))
        .route(
            "/api/requests/client/:client_id",
            get(requests::list_client_requests),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_actor));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .merge(staff_routes)
        .merge(technician_routes)
        .merge(authenticated_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
