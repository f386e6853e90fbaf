// SPDX-License-Identifier: MIT

//! Authorization middleware gating the panel routes.

use crate::error::AppError;
use crate::gate::{self, GateState};
use crate::services::SessionUser;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Middleware that requires an `AUTHORIZED` client profile.
///
/// Runs after [`super::auth::require_session`], so the session is already
/// resolved; this stage only performs the profile-status check. Pending,
/// missing, or unreadable profiles all deny access for this request.
pub async fn require_authorized(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<SessionUser>()
        .cloned()
        .ok_or(AppError::Unauthorized)?;

    match gate::from_profile_lookup(state.store.get_profile(user.user_id).await) {
        GateState::Authorized => Ok(next.run(request).await),
        _ => Err(AppError::AuthorizationPending),
    }
}
