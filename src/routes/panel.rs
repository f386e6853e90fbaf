// SPDX-License-Identifier: MIT

//! Panel routes: gate status and submission forms.
//!
//! `/api/session` resolves the gate state for the frontend to branch on and
//! is reachable with any session state, so the waiting notice can render.
//! The submission routes run behind the session and authorization middleware
//! (applied in routes/mod.rs).

use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::gate::{self, GateState};
use crate::middleware::auth::session_token;
use crate::models::{CollectionRequest, NewCollectionRequest, NewReferral, ReferralLead};
use crate::services::SessionUser;
use crate::AppState;

/// Gate status route (session-optional).
pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/session", get(get_session))
}

/// Submission routes (require an authorized session).
pub fn submission_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/referrals", post(submit_referral))
        .route("/api/collection-requests", post(submit_collection_request))
}

// ─── Gate status ─────────────────────────────────────────────

/// Gate check result for the current request.
#[derive(Serialize)]
pub struct SessionResponse {
    pub state: GateState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Run the authorization gate and report its state.
async fn get_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Json<SessionResponse> {
    let token = session_token(&jar, &headers);
    let outcome = gate::check(&state.identity, &state.store, token.as_deref()).await;

    Json(SessionResponse {
        state: outcome.state,
        email: outcome.user.and_then(|u| u.email),
    })
}

// ─── Submissions ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct SubmissionResponse {
    pub message: String,
}

/// Record a referral lead for the signed-in client.
async fn submit_referral(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Json(payload): Json<NewReferral>,
) -> Result<Json<SubmissionResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let lead = ReferralLead {
        referrer_id: user.user_id,
        referred_name: payload.referred_name,
        referred_phone: payload.referred_phone,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    state.store.insert_referral(&lead).await?;

    tracing::info!(referrer_id = %user.user_id, "Referral lead recorded");

    Ok(Json(SubmissionResponse {
        message: "¡Referido registrado con éxito! Gracias por tu apoyo.".to_string(),
    }))
}

/// Record an in-home collection request for the signed-in client.
async fn submit_collection_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Json(payload): Json<NewCollectionRequest>,
) -> Result<Json<SubmissionResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let request = CollectionRequest {
        client_id: user.user_id,
        requested_date: payload.requested_date,
        requested_time: payload.requested_time,
        address: payload.address,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    state.store.insert_collection_request(&request).await?;

    tracing::info!(client_id = %user.user_id, "Collection request recorded");

    Ok(Json(SubmissionResponse {
        message: "¡Solicitud de cobro enviada con éxito! Te contactaremos para confirmar la visita."
            .to_string(),
    }))
}
