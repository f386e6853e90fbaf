//! Referral lead model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Referral lead row in the `referrals` table.
///
/// Immutable once inserted, from this service's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralLead {
    /// Id of the client who referred the prospect
    pub referrer_id: Uuid,
    pub referred_name: String,
    pub referred_phone: String,
    /// Insertion timestamp (ISO 8601)
    pub created_at: String,
}

/// Referral submission payload. Fields are required but otherwise free-form;
/// the panel's input types are the only format constraint.
#[derive(Debug, Deserialize, Validate)]
pub struct NewReferral {
    #[validate(length(min = 1, message = "referred_name is required"))]
    pub referred_name: String,
    #[validate(length(min = 1, message = "referred_phone is required"))]
    pub referred_phone: String,
}
