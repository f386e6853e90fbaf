// SPDX-License-Identifier: MIT

//! Alfa-Referrals: client area backend for the Grupo Alfa referral program.
//!
//! This crate provides the backend API behind the customer panel: account
//! registration with manual authorization, referral lead submission, and
//! in-home collection requests. Identity and row storage live in a hosted
//! backend service; this server wraps both behind typed clients and gates
//! panel access on the per-user authorization status.

pub mod config;
pub mod db;
pub mod error;
pub mod gate;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::RowStore;
use services::IdentityService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub identity: IdentityService,
    pub store: RowStore,
}
