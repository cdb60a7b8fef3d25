//! Domain-specific error types for idealens

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Main error type for the idealens report service
#[derive(Error, Debug)]
pub enum IdealensError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Upstream model overloaded: {message}")]
    Overloaded { message: String },

    #[error("Upstream rate limit hit: {message}")]
    RateLimited { message: String },

    #[error("Upstream authentication failed: {message}")]
    Auth { message: String },

    #[error("Malformed model response: {message}")]
    MalformedResponse { message: String },

    #[error("Insufficient credits for user {user_id}")]
    InsufficientCredits { user_id: String },

    #[error("Payment verification failed: {message}")]
    PaymentVerification { message: String },

    #[error("Timeout error: {operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<anyhow::Error> for IdealensError {
    fn from(err: anyhow::Error) -> Self {
        IdealensError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for IdealensError {
    fn from(err: serde_json::Error) -> Self {
        IdealensError::MalformedResponse {
            message: err.to_string(),
        }
    }
}

impl From<sqlx::Error> for IdealensError {
    fn from(err: sqlx::Error) -> Self {
        IdealensError::Database {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for IdealensError {
    fn from(err: reqwest::Error) -> Self {
        IdealensError::Internal {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

/// Convert IdealensError into an HTTP response with a stable JSON error body
impl IntoResponse for IdealensError {
    fn into_response(self) -> Response {
        let status = match &self {
            IdealensError::Validation { .. } => StatusCode::BAD_REQUEST,
            IdealensError::Auth { .. } | IdealensError::PaymentVerification { .. } => {
                StatusCode::UNAUTHORIZED
            }
            IdealensError::InsufficientCredits { .. } => StatusCode::PAYMENT_REQUIRED,
            IdealensError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            IdealensError::Overloaded { .. } => StatusCode::SERVICE_UNAVAILABLE,
            IdealensError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            IdealensError::Config { .. }
            | IdealensError::MalformedResponse { .. }
            | IdealensError::Database { .. }
            | IdealensError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

/// Result type alias for idealens operations
pub type Result<T> = std::result::Result<T, IdealensError>;
