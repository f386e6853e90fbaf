//! Row storage layer (hosted REST API).

pub mod store;

pub use store::RowStore;

/// Table names as constants.
pub mod tables {
    pub const CLIENTS: &str = "clients";
    pub const REFERRALS: &str = "referrals";
    pub const COLLECTION_REQUESTS: &str = "collection_requests";
}
