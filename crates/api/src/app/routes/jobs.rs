//! On-demand runs of the periodic jobs.

use std::sync::Arc;

use axum::{extract::Extension, response::Response, routing::post, Json, Router};

use eventia_lifecycle::TransitionReport;
use eventia_notify::DispatchReport;

use crate::app::{errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/status-sync", post(status_sync))
        .route("/reminders", post(reminders))
}

/// POST /jobs/status-sync
pub async fn status_sync(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<TransitionReport>, Response> {
    let report = services
        .engine
        .run()
        .await
        .map_err(errors::lifecycle_error_to_response)?;
    Ok(Json(report))
}

/// POST /jobs/reminders
pub async fn reminders(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<DispatchReport>, Response> {
    let report = services
        .reminders
        .run()
        .await
        .map_err(errors::notify_error_to_response)?;
    Ok(Json(report))
}
