// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Account pending manual authorization")]
    AuthorizationPending,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Identity service error: {0}")]
    IdentityApi(String),

    #[error("Identity service unavailable: {0}")]
    IdentityUnavailable(String),

    #[error("Row store error: {0}")]
    Store(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::AuthorizationPending => {
                (StatusCode::FORBIDDEN, "authorization_pending", None)
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            // Provider messages are passed through verbatim so the panel can
            // show the user exactly what the hosted service said.
            AppError::IdentityApi(msg) => {
                (StatusCode::BAD_REQUEST, "auth_error", Some(msg.clone()))
            }
            AppError::IdentityUnavailable(msg) => {
                tracing::error!(error = %msg, "Identity service unreachable");
                (StatusCode::BAD_GATEWAY, "identity_unavailable", None)
            }
            AppError::Store(msg) => {
                tracing::error!(error = %msg, "Row store error");
                (StatusCode::BAD_GATEWAY, "store_error", Some(msg.clone()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
