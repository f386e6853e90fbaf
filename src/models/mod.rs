//! Data models for storage and API.

pub mod collection;
pub mod profile;
pub mod referral;

pub use collection::{CollectionRequest, NewCollectionRequest};
pub use profile::{ClientStatus, Profile};
pub use referral::{NewReferral, ReferralLead};
