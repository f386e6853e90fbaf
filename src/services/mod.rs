// SPDX-License-Identifier: MIT

//! Services module - clients for the hosted backend.

pub mod identity;

pub use identity::{IdentityService, Session, SessionUser};
