// SPDX-License-Identifier: MIT

//! Authorization gate for the client panel.
//!
//! Panel access requires two things in order: a valid session, and a client
//! profile whose status is `AUTHORIZED`. The gate resolves the session first
//! and only then fetches the profile, so unauthenticated requests never touch
//! the row store. A failed or empty profile lookup denies access for this
//! request (fail closed); there is no retry, the next request re-runs the
//! whole check.

use crate::db::RowStore;
use crate::error::AppError;
use crate::models::Profile;
use crate::services::{IdentityService, SessionUser};
use serde::Serialize;

/// Presentation state decided by the gate. Terminal for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    /// No valid session: send the caller to the sign-in surface.
    Unauthenticated,
    /// Signed in but not (yet) authorized: show the waiting notice.
    Pending,
    /// Authorized: render the panel.
    Authorized,
}

/// Outcome of a gate check, with the resolved session when one existed.
#[derive(Debug)]
pub struct GateOutcome {
    pub state: GateState,
    pub user: Option<SessionUser>,
}

/// Decide the gate state from a profile lookup for a signed-in user.
pub fn from_profile_lookup(lookup: Result<Option<Profile>, AppError>) -> GateState {
    match lookup {
        Ok(Some(profile)) if profile.status.is_authorized() => GateState::Authorized,
        Ok(Some(_)) => GateState::Pending,
        Ok(None) => {
            tracing::warn!("No client profile for signed-in user, denying access");
            GateState::Pending
        }
        Err(err) => {
            tracing::warn!(error = %err, "Profile lookup failed, denying access");
            GateState::Pending
        }
    }
}

/// Run the full gate check for one request.
pub async fn check(
    identity: &IdentityService,
    store: &RowStore,
    token: Option<&str>,
) -> GateOutcome {
    let user = match token.and_then(|t| identity.current_user(t).ok()) {
        Some(user) => user,
        None => {
            return GateOutcome {
                state: GateState::Unauthenticated,
                user: None,
            }
        }
    };

    let state = from_profile_lookup(store.get_profile(user.user_id).await);

    GateOutcome {
        state,
        user: Some(user),
    }
}
