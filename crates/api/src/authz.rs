//! Route-group guard applied after authentication.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use eventia_auth::{AuthError, OperationGroup, authorize_group};

use crate::app::errors::auth_error_to_response;
use crate::context::PrincipalContext;

/// Allow the request only when the principal's role is permitted for `group`.
pub async fn require_group(
    State(group): State<OperationGroup>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    let principal = req
        .extensions()
        .get::<PrincipalContext>()
        .ok_or_else(|| auth_error_to_response(AuthError::Unauthenticated))?;

    authorize_group(principal.principal(), group).map_err(auth_error_to_response)?;

    Ok(next.run(req).await)
}
