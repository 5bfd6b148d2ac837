use axum::{extract::Extension, http::StatusCode, Json};

use eventia_auth::Principal;

use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /me
pub async fn me(Extension(principal): Extension<PrincipalContext>) -> Json<Principal> {
    Json(principal.principal().clone())
}
