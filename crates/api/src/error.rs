//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`. Bodies are JSON `{"detail": ...}`; 401 replies
//! carry a `WWW-Authenticate: Bearer` header.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::gate::GateError;
use crate::validation::ValidationErrors;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Access gate refused the request.
    #[error("Gate error: {0}")]
    Gate(#[from] GateError),

    /// Request payload failed boundary validation.
    #[error("Validation error")]
    Validation(#[from] ValidationErrors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conditional update did not match (e.g., insufficient stock).
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                // Duplicate-entity conflicts answer 400, not 409.
                RepositoryError::Conflict(_) => StatusCode::BAD_REQUEST,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::AlreadyRegistered(_) => StatusCode::BAD_REQUEST,
                AuthError::Token(_) | AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Gate(err) => match err {
                GateError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
                GateError::Forbidden(_) => StatusCode::FORBIDDEN,
                GateError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) | Self::PreconditionFailed(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing `detail` value; internals are never exposed.
    fn detail(&self) -> Value {
        match self {
            Self::Validation(errors) => json!(errors.errors),
            Self::Auth(AuthError::InvalidCredentials) => json!("Incorrect username or password"),
            Self::Auth(AuthError::AlreadyRegistered(message)) => json!(message.clone()),
            Self::Gate(GateError::Unauthenticated(_)) => json!("Could not validate credentials"),
            Self::Gate(GateError::Forbidden(reason)) => json!(reason.detail()),
            Self::Database(RepositoryError::Conflict(message)) => json!(message.clone()),
            Self::Database(RepositoryError::NotFound) => json!("Not found"),
            Self::NotFound(message) | Self::PreconditionFailed(message) => json!(message.clone()),
            _ => json!("Internal server error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = Json(json!({ "detail": self.detail() }));

        if status == StatusCode::UNAUTHORIZED {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response();
        }

        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
