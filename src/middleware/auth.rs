// SPDX-License-Identifier: MIT

//! Session authentication middleware.

use crate::error::AppError;
use crate::services::SessionUser;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "alfa_token";

/// Pull the session token from the cookie jar or the Authorization header.
pub fn session_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    // Try cookie first, then header
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

/// Middleware that requires a valid session token.
///
/// Inserts the resolved [`SessionUser`] as a request extension. The token is
/// validated locally against the identity service's JWT secret.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(&jar, request.headers()).ok_or(AppError::Unauthorized)?;

    let user = state.identity.current_user(&token)?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
