use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use eventia_auth::AuthError;
use eventia_lifecycle::LifecycleStoreError;
use eventia_notify::NotifyError;

/// Map an auth failure to a response. Decode-level detail never reaches the caller.
pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "authentication required")
        }
        AuthError::TenantInactive => {
            json_error(StatusCode::FORBIDDEN, "tenant_inactive", "company account is inactive")
        }
        AuthError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", "operation not permitted"),
        AuthError::Unavailable(msg) => {
            tracing::error!(error = %msg, "auth backend unavailable");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
                "authentication backend unavailable",
            )
        }
    }
}

pub fn lifecycle_error_to_response(err: LifecycleStoreError) -> axum::response::Response {
    tracing::error!(error = %err, "lifecycle store failure");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "status store failure")
}

pub fn notify_error_to_response(err: NotifyError) -> axum::response::Response {
    tracing::error!(error = %err, "reminder dispatch failure");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "dispatch_error", "reminder dispatch failure")
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
