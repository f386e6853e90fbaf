// SPDX-License-Identifier: MIT

//! Identity session provider client (GoTrue-style auth API).
//!
//! Handles:
//! - Sign-up with email confirmation redirect
//! - Password sign-in and sign-out
//! - Confirmation-code to session exchange
//! - Local session token validation
//!
//! Session tokens are HS256 JWTs signed with the project JWT secret, so
//! `current_user` validates them locally without a network round trip. The
//! mock backend keeps accounts in memory and mints real tokens with the same
//! secret, which lets the full router run in tests.

use crate::config::Config;
use crate::error::AppError;
use dashmap::DashMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Session lifetime issued by the mock backend. The hosted service reports
/// its own `expires_in` on every token grant.
const MOCK_SESSION_TTL_SECS: u64 = 3600;

/// Audience the identity service stamps into every access token.
const TOKEN_AUDIENCE: &str = "authenticated";

/// JWT claims carried in a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (identity user id)
    pub sub: String,
    /// Audience (always "authenticated" for signed-in users)
    pub aud: String,
    /// Email at sign-in time
    pub email: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user resolved from a session token.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub email: Option<String>,
}

/// Identity account as reported by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Session issued by a token grant.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
    pub user: IdentityUser,
}

fn default_expires_in() -> u64 {
    MOCK_SESSION_TTL_SECS
}

/// Identity service client.
#[derive(Clone)]
pub struct IdentityService {
    backend: Backend,
    jwt_secret: Vec<u8>,
}

#[derive(Clone)]
enum Backend {
    Remote {
        http: reqwest::Client,
        base_url: String,
        api_key: String,
    },
    Mock(Arc<MockIdentity>),
}

#[derive(Default)]
struct MockIdentity {
    /// Accounts keyed by email
    users: DashMap<String, MockUser>,
    /// Pending email-confirmation codes
    codes: DashMap<String, MockUser>,
    /// Tokens revoked through sign-out
    revoked: DashMap<String, ()>,
}

#[derive(Clone)]
struct MockUser {
    id: Uuid,
    email: String,
    password: String,
}

impl IdentityService {
    /// Create a client for the hosted identity API.
    pub fn new(config: &Config) -> Self {
        Self {
            backend: Backend::Remote {
                http: reqwest::Client::new(),
                base_url: config.supabase_url.clone(),
                api_key: config.supabase_anon_key.clone(),
            },
            jwt_secret: config.jwt_secret.clone(),
        }
    }

    /// Create an in-memory mock client for testing.
    ///
    /// Accounts live in memory and session tokens are signed with the given
    /// secret, so they validate against a server configured with the same one.
    pub fn new_mock(jwt_secret: Vec<u8>) -> Self {
        Self {
            backend: Backend::Mock(Arc::new(MockIdentity::default())),
            jwt_secret,
        }
    }

    /// Register a new account. The provider sends a confirmation email whose
    /// link lands on `redirect_url` with a `code` query parameter.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_url: &str,
    ) -> Result<IdentityUser, AppError> {
        match &self.backend {
            Backend::Remote {
                http,
                base_url,
                api_key,
            } => {
                let response = http
                    .post(format!("{}/auth/v1/signup", base_url))
                    .header("apikey", api_key)
                    .query(&[("redirect_to", redirect_url)])
                    .json(&serde_json::json!({ "email": email, "password": password }))
                    .send()
                    .await
                    .map_err(|e| AppError::IdentityUnavailable(e.to_string()))?;

                check_response_json(response).await
            }
            Backend::Mock(mock) => {
                if password.len() < 6 {
                    return Err(AppError::IdentityApi(
                        "Password should be at least 6 characters.".to_string(),
                    ));
                }
                if mock.users.contains_key(email) {
                    return Err(AppError::IdentityApi("User already registered".to_string()));
                }

                let user = MockUser {
                    id: Uuid::new_v4(),
                    email: email.to_string(),
                    password: password.to_string(),
                };
                mock.users.insert(email.to_string(), user.clone());
                mock.codes.insert(Uuid::new_v4().to_string(), user.clone());

                Ok(IdentityUser {
                    id: user.id,
                    email: Some(user.email),
                })
            }
        }
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        match &self.backend {
            Backend::Remote {
                http,
                base_url,
                api_key,
            } => {
                let response = http
                    .post(format!("{}/auth/v1/token", base_url))
                    .header("apikey", api_key)
                    .query(&[("grant_type", "password")])
                    .json(&serde_json::json!({ "email": email, "password": password }))
                    .send()
                    .await
                    .map_err(|e| AppError::IdentityUnavailable(e.to_string()))?;

                check_response_json(response).await
            }
            Backend::Mock(mock) => {
                let user = mock
                    .users
                    .get(email)
                    .filter(|u| u.value().password == password)
                    .map(|u| u.value().clone())
                    .ok_or_else(|| {
                        AppError::IdentityApi("Invalid login credentials".to_string())
                    })?;

                self.issue_session(&user)
            }
        }
    }

    /// Exchange an email-confirmation code for a session.
    pub async fn exchange_code(&self, code: &str) -> Result<Session, AppError> {
        match &self.backend {
            Backend::Remote {
                http,
                base_url,
                api_key,
            } => {
                let response = http
                    .post(format!("{}/auth/v1/token", base_url))
                    .header("apikey", api_key)
                    .query(&[("grant_type", "pkce")])
                    .json(&serde_json::json!({ "auth_code": code }))
                    .send()
                    .await
                    .map_err(|e| AppError::IdentityUnavailable(e.to_string()))?;

                check_response_json(response).await
            }
            Backend::Mock(mock) => {
                let (_, user) = mock.codes.remove(code).ok_or_else(|| {
                    AppError::IdentityApi("Invalid or expired confirmation code".to_string())
                })?;

                self.issue_session(&user)
            }
        }
    }

    /// Revoke a session with the provider.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Remote {
                http,
                base_url,
                api_key,
            } => {
                let response = http
                    .post(format!("{}/auth/v1/logout", base_url))
                    .header("apikey", api_key)
                    .bearer_auth(access_token)
                    .send()
                    .await
                    .map_err(|e| AppError::IdentityUnavailable(e.to_string()))?;

                if response.status().is_success() {
                    Ok(())
                } else {
                    Err(AppError::IdentityApi(error_message(response).await))
                }
            }
            Backend::Mock(mock) => {
                mock.revoked.insert(access_token.to_string(), ());
                Ok(())
            }
        }
    }

    /// Resolve the current user from a session token.
    ///
    /// Validates the token signature and expiry locally against the shared
    /// JWT secret. Any invalid token resolves to `Unauthorized`.
    pub fn current_user(&self, access_token: &str) -> Result<SessionUser, AppError> {
        let key = DecodingKey::from_secret(&self.jwt_secret);
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[TOKEN_AUDIENCE]);

        let token_data = decode::<Claims>(access_token, &key, &validation)
            .map_err(|_| AppError::Unauthorized)?;

        let user_id: Uuid = token_data
            .claims
            .sub
            .parse()
            .map_err(|_| AppError::Unauthorized)?;

        Ok(SessionUser {
            user_id,
            email: token_data.claims.email,
        })
    }

    /// Whether a token was revoked through sign-out. Mock mode only; the
    /// hosted service tracks revocation on its side.
    pub fn mock_revoked(&self, access_token: &str) -> bool {
        match &self.backend {
            Backend::Remote { .. } => false,
            Backend::Mock(mock) => mock.revoked.contains_key(access_token),
        }
    }

    /// Look up the pending confirmation code for an email. Mock mode only;
    /// the hosted service delivers codes by email.
    pub fn mock_confirmation_code(&self, email: &str) -> Option<String> {
        match &self.backend {
            Backend::Remote { .. } => None,
            Backend::Mock(mock) => mock
                .codes
                .iter()
                .find(|entry| entry.value().email == email)
                .map(|entry| entry.key().clone()),
        }
    }

    fn issue_session(&self, user: &MockUser) -> Result<Session, AppError> {
        let token = create_session_token(user.id, Some(user.email.clone()), &self.jwt_secret)
            .map_err(AppError::Internal)?;

        Ok(Session {
            access_token: token,
            expires_in: MOCK_SESSION_TTL_SECS,
            user: IdentityUser {
                id: user.id,
                email: Some(user.email.clone()),
            },
        })
    }
}

/// Mint a session token the way the identity service does.
pub fn create_session_token(
    user_id: Uuid,
    email: Option<String>,
    jwt_secret: &[u8],
) -> anyhow::Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        aud: TOKEN_AUDIENCE.to_string(),
        email,
        iat: now,
        exp: now + MOCK_SESSION_TTL_SECS as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret),
    )?)
}

/// Check response status and deserialize, surfacing provider error messages.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        return Err(AppError::IdentityApi(error_message(response).await));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::IdentityApi(format!("Invalid response body: {}", e)))
}

/// Extract the human-readable message from a provider error body.
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
        for key in ["msg", "error_description", "message"] {
            if let Some(msg) = json.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }

    format!("Identity API returned {}: {}", status, body)
}
