//! Client profile model tracking manual-authorization status.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authorization status of a client account.
///
/// New accounts start out `Pending` and are flipped to `Authorized` by an
/// administrative action outside this service. Any value we don't recognize
/// gates exactly like `Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientStatus {
    Pending,
    Authorized,
    #[serde(untagged)]
    Other(String),
}

impl ClientStatus {
    pub fn is_authorized(&self) -> bool {
        matches!(self, ClientStatus::Authorized)
    }
}

/// Per-user profile row in the `clients` table.
///
/// One row exists for every signed-up user; it is created at sign-up time
/// alongside the identity account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Identity user id (also the row key)
    pub id: Uuid,
    pub email: String,
    pub status: ClientStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_round_trip() {
        let json = serde_json::to_string(&ClientStatus::Pending).unwrap();
        assert_eq!(json, "\"PENDING\"");

        let status: ClientStatus = serde_json::from_str("\"AUTHORIZED\"").unwrap();
        assert!(status.is_authorized());
    }

    #[test]
    fn test_unknown_status_is_not_authorized() {
        let status: ClientStatus = serde_json::from_str("\"SUSPENDED\"").unwrap();
        assert_eq!(status, ClientStatus::Other("SUSPENDED".to_string()));
        assert!(!status.is_authorized());
    }
}
