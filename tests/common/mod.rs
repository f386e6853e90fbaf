// SPDX-License-Identifier: MIT

use alfa_referrals::config::Config;
use alfa_referrals::db::RowStore;
use alfa_referrals::routes::create_router;
use alfa_referrals::services::identity::create_session_token;
use alfa_referrals::services::IdentityService;
use alfa_referrals::AppState;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use std::sync::Arc;
use uuid::Uuid;

/// Create a test app with in-memory mock backends.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let identity = IdentityService::new_mock(config.jwt_secret.clone());
    let store = RowStore::new_mock();

    let state = Arc::new(AppState {
        config,
        identity,
        store,
    });

    (create_router(state.clone()), state)
}

/// Mint a session token the way the identity service would.
#[allow(dead_code)]
pub fn test_session_token(state: &AppState, user_id: Uuid, email: &str) -> String {
    create_session_token(user_id, Some(email.to_string()), &state.config.jwt_secret)
        .expect("token creation should not fail")
}

/// Build a JSON POST request.
#[allow(dead_code)]
pub fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

/// Build a JSON POST request carrying a session cookie.
#[allow(dead_code)]
pub fn json_post_with_session(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, format!("alfa_token={}", token))
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

/// Build a GET request carrying a session cookie.
#[allow(dead_code)]
pub fn get_with_session(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, format!("alfa_token={}", token))
        .body(Body::empty())
        .unwrap()
}

/// Read a JSON response body.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Extract the session token value from a Set-Cookie header, if present.
#[allow(dead_code)]
pub fn session_cookie_value(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("alfa_token="))
        .map(|v| {
            v.split(';')
                .next()
                .unwrap()
                .trim_start_matches("alfa_token=")
                .to_string()
        })
}
