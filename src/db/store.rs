// SPDX-License-Identifier: MIT

//! Row store client with typed operations.
//!
//! Wraps the hosted PostgREST-style API over three tables:
//! - Clients (per-user profile with authorization status)
//! - Referrals (submitted leads)
//! - Collection requests (scheduled in-home visits)
//!
//! The mock backend keeps rows in memory for tests and can be armed to fail
//! the next select or insert with a given provider message, which is how the
//! fail-closed and error-surfacing paths get exercised.

use crate::config::Config;
use crate::db::tables;
use crate::error::AppError;
use crate::models::{CollectionRequest, Profile, ReferralLead};
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Row store client.
#[derive(Clone)]
pub struct RowStore {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Remote {
        http: reqwest::Client,
        base_url: String,
        api_key: String,
    },
    Mock(Arc<MockTables>),
}

#[derive(Default)]
struct MockTables {
    profiles: DashMap<Uuid, Profile>,
    referrals: DashMap<Uuid, ReferralLead>,
    collection_requests: DashMap<Uuid, CollectionRequest>,
    fail_next_select: Mutex<Option<String>>,
    fail_next_insert: Mutex<Option<String>>,
}

impl RowStore {
    /// Create a client for the hosted row storage API.
    pub fn new(config: &Config) -> Self {
        Self {
            backend: Backend::Remote {
                http: reqwest::Client::new(),
                base_url: config.supabase_url.clone(),
                api_key: config.supabase_anon_key.clone(),
            },
        }
    }

    /// Create an in-memory mock store for testing.
    pub fn new_mock() -> Self {
        Self {
            backend: Backend::Mock(Arc::new(MockTables::default())),
        }
    }

    /// Arm the mock store so its next select fails with `message`. No-op in
    /// remote mode.
    pub fn fail_next_select(&self, message: &str) {
        if let Backend::Mock(mock) = &self.backend {
            *mock.fail_next_select.lock().unwrap() = Some(message.to_string());
        }
    }

    /// Arm the mock store so its next insert fails with `message`. No-op in
    /// remote mode.
    pub fn fail_next_insert(&self, message: &str) {
        if let Backend::Mock(mock) = &self.backend {
            *mock.fail_next_insert.lock().unwrap() = Some(message.to_string());
        }
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Create or replace a client profile.
    pub async fn insert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        match &self.backend {
            Backend::Remote { .. } => self.insert_row(tables::CLIENTS, profile).await,
            Backend::Mock(mock) => {
                mock.take_insert_failure()?;
                mock.profiles.insert(profile.id, profile.clone());
                Ok(())
            }
        }
    }

    /// Fetch a client profile by identity user id.
    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        match &self.backend {
            Backend::Remote {
                http,
                base_url,
                api_key,
            } => {
                let response = http
                    .get(format!("{}/rest/v1/{}", base_url, tables::CLIENTS))
                    .header("apikey", api_key)
                    .bearer_auth(api_key)
                    .query(&[("id", format!("eq.{}", user_id)), ("select", "*".into())])
                    .send()
                    .await
                    .map_err(|e| AppError::Store(e.to_string()))?;

                let rows: Vec<Profile> = check_response_json(response).await?;
                Ok(rows.into_iter().next())
            }
            Backend::Mock(mock) => {
                mock.take_select_failure()?;
                Ok(mock.profiles.get(&user_id).map(|p| p.value().clone()))
            }
        }
    }

    // ─── Submission Operations ───────────────────────────────────

    /// Record a referral lead.
    pub async fn insert_referral(&self, lead: &ReferralLead) -> Result<(), AppError> {
        match &self.backend {
            Backend::Remote { .. } => self.insert_row(tables::REFERRALS, lead).await,
            Backend::Mock(mock) => {
                mock.take_insert_failure()?;
                mock.referrals.insert(Uuid::new_v4(), lead.clone());
                Ok(())
            }
        }
    }

    /// Record an in-home collection request.
    pub async fn insert_collection_request(
        &self,
        request: &CollectionRequest,
    ) -> Result<(), AppError> {
        match &self.backend {
            Backend::Remote { .. } => {
                self.insert_row(tables::COLLECTION_REQUESTS, request).await
            }
            Backend::Mock(mock) => {
                mock.take_insert_failure()?;
                mock.collection_requests.insert(Uuid::new_v4(), request.clone());
                Ok(())
            }
        }
    }

    /// Generic single-row insert against the hosted API.
    async fn insert_row<T: Serialize>(&self, table: &str, row: &T) -> Result<(), AppError> {
        let Backend::Remote {
            http,
            base_url,
            api_key,
        } = &self.backend
        else {
            unreachable!("insert_row is only called in remote mode");
        };

        let response = http
            .post(format!("{}/rest/v1/{}", base_url, table))
            .header("apikey", api_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(api_key)
            .json(row)
            .send()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AppError::Store(error_message(response).await))
        }
    }
}

impl MockTables {
    fn take_select_failure(&self) -> Result<(), AppError> {
        if let Some(msg) = self.fail_next_select.lock().unwrap().take() {
            return Err(AppError::Store(msg));
        }
        Ok(())
    }

    fn take_insert_failure(&self) -> Result<(), AppError> {
        if let Some(msg) = self.fail_next_insert.lock().unwrap().take() {
            return Err(AppError::Store(msg));
        }
        Ok(())
    }
}

/// Check response status and deserialize, surfacing provider error messages.
async fn check_response_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        return Err(AppError::Store(error_message(response).await));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Store(format!("Invalid response body: {}", e)))
}

/// Extract the human-readable message from a provider error body.
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
        if let Some(msg) = json.get("message").and_then(|v| v.as_str()) {
            return msg.to_string();
        }
    }

    format!("Row store returned {}: {}", status, body)
}
