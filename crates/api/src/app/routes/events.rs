//! Manual event status changes by company admins.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::patch,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use eventia_auth::AuthError;
use eventia_core::EventId;
use eventia_lifecycle::EventStatus;

use crate::app::{errors, services::AppServices};
use crate::context::{PrincipalContext, TenantContext};

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatusChanged {
    pub id: EventId,
    pub status: EventStatus,
}

pub fn router() -> Router {
    Router::new().route("/:id/status", patch(set_status))
}

/// PATCH /events/:id/status
///
/// Only events of the caller's own company are visible; others read as 404.
pub async fn set_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    tenant: Option<Extension<TenantContext>>,
    Path(id): Path<String>,
    Json(body): Json<StatusChange>,
) -> Result<Json<StatusChanged>, Response> {
    let Some(Extension(tenant)) = tenant else {
        return Err(errors::auth_error_to_response(AuthError::Forbidden));
    };
    let tenant_id = tenant.tenant_id();

    let id: EventId = id
        .parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid event id"))?;
    let status: EventStatus = body.status.parse().map_err(|e: eventia_core::DomainError| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_status", e.to_string())
    })?;

    let updated = services
        .status_writer
        .set_event_status_for_tenant(tenant_id, id, status)
        .await
        .map_err(errors::lifecycle_error_to_response)?;

    if !updated {
        return Err(errors::json_error(StatusCode::NOT_FOUND, "not_found", "event not found"));
    }

    tracing::info!(
        event = %id,
        tenant = %tenant_id,
        user = %principal.user_id(),
        status = %status,
        "event status changed manually"
    );
    Ok(Json(StatusChanged { id, status }))
}
