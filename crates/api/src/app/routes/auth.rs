//! Session endpoints: login, refresh and logout.
//!
//! Tokens travel both as `HttpOnly` cookies and in the JSON body.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use eventia_auth::{AuthError, TokenPair};

use crate::app::{errors, services::AppServices};
use crate::config::CookieSettings;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

/// POST /auth/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<TokenPair>), Response> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "email and password are required",
        ));
    }

    let (_, pair) = services
        .issuer
        .login(services.credentials.as_ref(), body.email.trim(), &body.password)
        .await
        .map_err(errors::auth_error_to_response)?;

    Ok((with_session_cookies(jar, &services.cookies, &pair), Json(pair)))
}

/// POST /auth/refresh
///
/// The refresh cookie is preferred; a JSON body `{"refresh_token": ...}` is the fallback.
pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<(CookieJar, Json<TokenPair>), Response> {
    let from_cookie = jar
        .get(&services.cookies.refresh_name)
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty());
    let from_body = body
        .and_then(|Json(b)| b.refresh_token)
        .map(|t| t.trim().to_string())
        .filter(|v| !v.is_empty());

    let token = from_cookie
        .or(from_body)
        .ok_or_else(|| errors::auth_error_to_response(AuthError::Unauthenticated))?;

    let (_, pair) = services
        .issuer
        .refresh(&token)
        .await
        .map_err(errors::auth_error_to_response)?;

    Ok((with_session_cookies(jar, &services.cookies, &pair), Json(pair)))
}

/// POST /auth/logout
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    jar: CookieJar,
) -> impl IntoResponse {
    let jar = jar
        .remove(Cookie::build((services.cookies.access_name.clone(), "")).path("/"))
        .remove(Cookie::build((services.cookies.refresh_name.clone(), "")).path("/"));
    (jar, StatusCode::NO_CONTENT)
}

fn with_session_cookies(jar: CookieJar, settings: &CookieSettings, pair: &TokenPair) -> CookieJar {
    jar.add(session_cookie(
        settings.access_name.clone(),
        pair.access_token.clone(),
        settings.secure,
    ))
    .add(session_cookie(
        settings.refresh_name.clone(),
        pair.refresh_token.clone(),
        settings.secure,
    ))
}

fn session_cookie(name: String, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_http_only_and_lax() {
        let cookie = session_cookie("access_token".into(), "abc".into(), false);
        let rendered = cookie.to_string();
        assert!(rendered.starts_with("access_token=abc"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Path=/"));
        assert!(!rendered.contains("Secure"));
    }

    #[test]
    fn secure_flag_follows_settings() {
        let cookie = session_cookie("refresh_token".into(), "xyz".into(), true);
        assert!(cookie.to_string().contains("Secure"));
    }
}
