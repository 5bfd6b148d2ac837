use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use eventia_auth::{CredentialVerifier, PresentedCredentials};

use crate::app::errors::auth_error_to_response;
use crate::context::{PrincipalContext, TenantContext};

#[derive(Clone)]
pub struct AuthState {
    pub verifier: CredentialVerifier,
    pub access_cookie: String,
}

/// Resolve the caller from the access cookie or the bearer header.
///
/// Inserts [`PrincipalContext`], plus [`TenantContext`] when the principal has
/// an active company.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let principal = {
        let jar = CookieJar::from_headers(req.headers());
        let cookie = jar.get(&state.access_cookie).map(|c| c.value().to_string());
        let credentials = PresentedCredentials {
            cookie: cookie.as_deref(),
            authorization: authorization_header(req.headers()),
        };
        state
            .verifier
            .verify(credentials)
            .await
            .map_err(auth_error_to_response)?
    };

    if let Ok(tenant_id) = principal.require_tenant() {
        req.extensions_mut().insert(TenantContext::new(tenant_id));
    }
    req.extensions_mut().insert(PrincipalContext::new(principal));

    Ok(next.run(req).await)
}

fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::AUTHORIZATION)?.to_str().ok()
}
