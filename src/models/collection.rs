//! In-home collection request model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Collection request row in the `collection_requests` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionRequest {
    /// Id of the client requesting the visit
    pub client_id: Uuid,
    /// Requested visit date (YYYY-MM-DD, as produced by a date input)
    pub requested_date: String,
    /// Requested visit time (HH:MM)
    pub requested_time: String,
    pub address: String,
    /// Insertion timestamp (ISO 8601)
    pub created_at: String,
}

/// Collection request submission payload.
#[derive(Debug, Deserialize, Validate)]
pub struct NewCollectionRequest {
    #[validate(length(min = 1, message = "requested_date is required"))]
    pub requested_date: String,
    #[validate(length(min = 1, message = "requested_time is required"))]
    pub requested_time: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
}
