// SPDX-License-Identifier: MIT

//! Alfa-Referrals API Server
//!
//! Backend for the Grupo Alfa client area: registration with manual
//! authorization, referral lead submission, and in-home collection requests.

use alfa_referrals::{config::Config, db::RowStore, services::IdentityService, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Alfa-Referrals API");

    // Clients for the hosted identity and row-storage APIs
    let identity = IdentityService::new(&config);
    let store = RowStore::new(&config);
    tracing::info!(url = %config.supabase_url, "Hosted backend clients initialized");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        identity,
        store,
    });

    // Build router
    let app = alfa_referrals::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("alfa_referrals=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
