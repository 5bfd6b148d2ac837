use axum::{
    routing::{get, MethodRouter},
    Router,
};

use eventia_auth::OperationGroup;

use crate::authz;

pub mod auth;
pub mod events;
pub mod jobs;
pub mod system;

/// Router for the unauthenticated session endpoints.
pub fn public_router() -> Router {
    Router::new().nest("/auth", auth::router())
}

/// Router for all authenticated endpoints, each group behind its role guard.
pub fn router() -> Router {
    Router::new()
        .route("/me", guarded(get(system::me), OperationGroup::Account))
        .nest("/events", guard(events::router(), OperationGroup::Management))
        .nest("/jobs", guard(jobs::router(), OperationGroup::Companies))
}

fn guard(router: Router, group: OperationGroup) -> Router {
    router.route_layer(axum::middleware::from_fn_with_state(group, authz::require_group))
}

fn guarded(route: MethodRouter, group: OperationGroup) -> MethodRouter {
    route.route_layer(axum::middleware::from_fn_with_state(group, authz::require_group))
}
