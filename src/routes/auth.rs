// SPDX-License-Identifier: MIT

//! Authentication routes: sign-up, sign-in, confirmation callback, sign-out.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::middleware::auth::{session_token, SESSION_COOKIE};
use crate::models::{ClientStatus, Profile};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/callback", get(callback))
        .route("/auth/logout", post(logout))
}

// ─── Sign-up ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub user_id: Uuid,
    pub message: String,
}

/// Register a new account and create its profile with status `PENDING`.
///
/// The confirmation email links back to `/auth/callback` on this server.
/// If the profile insert fails after the identity account was created, the
/// account is not rolled back; the caller is told to contact support.
async fn signup(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<SignupResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let redirect_url = callback_url(&headers);
    let user = state
        .identity
        .sign_up(&payload.email, &payload.password, &redirect_url)
        .await?;

    let profile = Profile {
        id: user.id,
        email: user.email.clone().unwrap_or(payload.email),
        status: ClientStatus::Pending,
    };

    let message = match state.store.insert_profile(&profile).await {
        Ok(()) => {
            tracing::info!(user_id = %user.id, "Account registered, profile pending authorization");
            "¡Registro exitoso! Revisa tu correo electrónico para confirmar tu cuenta. \
             Tu acceso quedará en estado PENDIENTE hasta que un asesor lo autorice."
        }
        Err(err) => {
            tracing::error!(user_id = %user.id, error = %err, "Profile insert failed after sign-up");
            "Registro de usuario exitoso, pero hubo un error al crear el perfil. \
             Contacta a soporte."
        }
    };

    Ok(Json(SignupResponse {
        user_id: user.id,
        message: message.to_string(),
    }))
}

/// Build the confirmation callback URL from the request host.
fn callback_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost:8080");

    let scheme = if host.contains("localhost") || host.contains("127.0.0.1") {
        "http"
    } else {
        "https"
    };

    format!("{}://{}/auth/callback", scheme, host)
}

// ─── Sign-in ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: String,
}

/// Sign in with email and password, setting the session cookie.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let session = state
        .identity
        .sign_in(&payload.email, &payload.password)
        .await?;

    tracing::info!(user_id = %session.user.id, "Sign-in successful");

    let jar = jar.add(session_cookie(
        &state.config,
        &session.access_token,
        session.expires_in,
    ));

    Ok((
        jar,
        Json(LoginResponse {
            message: "¡Acceso exitoso! Redireccionando...".to_string(),
        }),
    ))
}

// ─── Email confirmation callback ─────────────────────────────

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
}

/// Process the confirmation link from the sign-up email.
///
/// Exchanges the one-time code for a session, sets the cookie, and redirects
/// to the panel, where the authorization gate takes over. A failed exchange
/// redirects to the sign-in surface with the provider's message.
async fn callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, Redirect) {
    let mut jar = jar;

    if let Some(code) = params.code {
        match state.identity.exchange_code(&code).await {
            Ok(session) => {
                tracing::info!(user_id = %session.user.id, "Account confirmed, session established");
                jar = jar.add(session_cookie(
                    &state.config,
                    &session.access_token,
                    session.expires_in,
                ));
            }
            Err(err) => {
                tracing::warn!(error = %err, "Confirmation code exchange failed");
                let redirect = format!(
                    "{}/login?error={}",
                    state.config.frontend_url,
                    urlencoding::encode(&err.to_string())
                );
                return (jar, Redirect::temporary(&redirect));
            }
        }
    }

    let panel_url = format!("{}/panel", state.config.frontend_url);
    (jar, Redirect::temporary(&panel_url))
}

// ─── Sign-out ────────────────────────────────────────────────

/// Sign out: revoke the session with the provider and clear the cookie.
/// Honors the same cookie-or-bearer token sources as the session middleware.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> (CookieJar, StatusCode) {
    if let Some(token) = session_token(&jar, &headers) {
        if let Err(err) = state.identity.sign_out(&token).await {
            tracing::warn!(error = %err, "Provider sign-out failed, clearing cookie anyway");
        }
    }

    let jar = jar.remove(removal_cookie(&state.config));
    (jar, StatusCode::NO_CONTENT)
}

// ─── Cookie helpers ──────────────────────────────────────────

/// Build the session cookie. `Secure` is set when the deployment is served
/// over HTTPS, which the frontend URL scheme stands in for.
fn session_cookie(config: &Config, token: &str, expires_in: u64) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::seconds(expires_in as i64));
    cookie.set_secure(config.frontend_url.starts_with("https://"));
    cookie
}

/// Removal cookie with attributes matching the ones set at creation.
fn removal_cookie(config: &Config) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(config.frontend_url.starts_with("https://"));
    cookie
}
