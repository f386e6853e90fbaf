// SPDX-License-Identifier: MIT

//! Request middleware.

pub mod auth;
pub mod authorize;
pub mod security;
