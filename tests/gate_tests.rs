// SPDX-License-Identifier: MIT

//! Authorization gate tests.
//!
//! These tests verify that:
//! 1. Only profiles with status AUTHORIZED open the panel
//! 2. Missing profiles and failed lookups deny access (fail closed)
//! 3. Unauthenticated requests never reach the profile store

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use alfa_referrals::models::{ClientStatus, Profile};

mod common;

async fn seed_profile(state: &alfa_referrals::AppState, email: &str, status: ClientStatus) -> Uuid {
    let id = Uuid::new_v4();
    state
        .store
        .insert_profile(&Profile {
            id,
            email: email.to_string(),
            status,
        })
        .await
        .unwrap();
    id
}

#[tokio::test]
async fn test_session_endpoint_without_token() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["state"], "unauthenticated");
}

#[tokio::test]
async fn test_session_endpoint_with_garbage_token() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(common::get_with_session("/api/session", "not.a.jwt"))
        .await
        .unwrap();

    let body = common::body_json(response).await;
    assert_eq!(body["state"], "unauthenticated");
}

#[tokio::test]
async fn test_session_with_no_profile_is_pending() {
    let (app, state) = common::create_test_app();
    let token = common::test_session_token(&state, Uuid::new_v4(), "a@b.com");

    let response = app
        .oneshot(common::get_with_session("/api/session", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["state"], "pending");
}

#[tokio::test]
async fn test_pending_profile_is_pending() {
    let (app, state) = common::create_test_app();
    let user_id = seed_profile(&state, "a@b.com", ClientStatus::Pending).await;
    let token = common::test_session_token(&state, user_id, "a@b.com");

    let response = app
        .oneshot(common::get_with_session("/api/session", &token))
        .await
        .unwrap();

    let body = common::body_json(response).await;
    assert_eq!(body["state"], "pending");
    assert_eq!(body["email"], "a@b.com");
}

#[tokio::test]
async fn test_authorized_profile_opens_panel() {
    let (app, state) = common::create_test_app();
    let user_id = seed_profile(&state, "a@b.com", ClientStatus::Authorized).await;
    let token = common::test_session_token(&state, user_id, "a@b.com");

    let response = app
        .clone()
        .oneshot(common::get_with_session("/api/session", &token))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["state"], "authorized");

    // Submissions are open too
    let response = app
        .oneshot(common::json_post_with_session(
            "/api/referrals",
            &token,
            json!({ "referred_name": "Ana López", "referred_phone": "555-0100" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_status_gates_like_pending() {
    let (app, state) = common::create_test_app();
    let user_id = seed_profile(
        &state,
        "a@b.com",
        ClientStatus::Other("SUSPENDED".to_string()),
    )
    .await;
    let token = common::test_session_token(&state, user_id, "a@b.com");

    let response = app
        .oneshot(common::json_post_with_session(
            "/api/referrals",
            &token,
            json!({ "referred_name": "Ana", "referred_phone": "555-0100" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "authorization_pending");
}

#[tokio::test]
async fn test_pending_user_cannot_submit() {
    let (app, state) = common::create_test_app();
    let user_id = seed_profile(&state, "a@b.com", ClientStatus::Pending).await;
    let token = common::test_session_token(&state, user_id, "a@b.com");

    let response = app
        .oneshot(common::json_post_with_session(
            "/api/collection-requests",
            &token,
            json!({
                "requested_date": "2026-09-15",
                "requested_time": "10:30",
                "address": "Calle 1 #23, Col. Centro"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_submission_without_session_is_unauthorized() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(common::json_post(
            "/api/referrals",
            json!({ "referred_name": "Ana", "referred_phone": "555-0100" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_lookup_error_fails_closed() {
    let (app, state) = common::create_test_app();
    let user_id = seed_profile(&state, "a@b.com", ClientStatus::Authorized).await;
    let token = common::test_session_token(&state, user_id, "a@b.com");

    state.store.fail_next_select("connection reset by peer");

    // The failed lookup denies access even though the stored status is
    // AUTHORIZED. No retry happens within the request.
    let response = app
        .clone()
        .oneshot(common::get_with_session("/api/session", &token))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["state"], "pending");

    // A fresh request runs the gate again and succeeds
    let response = app
        .oneshot(common::get_with_session("/api/session", &token))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["state"], "authorized");
}

#[tokio::test]
async fn test_unauthenticated_check_never_touches_store() {
    let (app, state) = common::create_test_app();
    let user_id = seed_profile(&state, "a@b.com", ClientStatus::Authorized).await;
    let token = common::test_session_token(&state, user_id, "a@b.com");

    state.store.fail_next_select("should not be consumed");

    // No session: the gate stops before the profile lookup, leaving the
    // armed failure in place.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["state"], "unauthenticated");

    // The next authenticated check consumes it, proving the lookup order
    let response = app
        .oneshot(common::get_with_session("/api/session", &token))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["state"], "pending");
}
