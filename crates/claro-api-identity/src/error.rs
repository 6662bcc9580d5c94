//! Error types for the identity synchronization API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Identity synchronization error variants.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The webhook request failed signature verification (missing headers,
    /// signature mismatch, or tampered body). Fail closed: no mutation.
    #[error("Webhook verification failed: {0}")]
    Verification(String),

    /// The body verified but did not parse as the expected event envelope.
    #[error("Invalid event payload: {0}")]
    InvalidPayload(String),

    /// The session request carried no valid credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// The service is misconfigured (e.g. empty signing secret).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A store operation failed. Surfaced as 5xx so the provider retries;
    /// safe because reconciliation is idempotent.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// JSON error response returned by identity API endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status: u16,
}

impl IdentityError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::Verification(_) | IdentityError::InvalidPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            IdentityError::Unauthorized => StatusCode::UNAUTHORIZED,
            IdentityError::Configuration(_) | IdentityError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            IdentityError::Verification(_) => "verification_failed",
            IdentityError::InvalidPayload(_) => "invalid_payload",
            IdentityError::Unauthorized => "unauthorized",
            IdentityError::Configuration(_) => "configuration_error",
            IdentityError::Database(_) => "database_error",
        }
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Internal failures are logged with full detail but never exposed.
        let message = match &self {
            IdentityError::Database(e) => {
                tracing::error!("Identity database error: {:?}", e);
                "A database error occurred".to_string()
            }
            IdentityError::Configuration(msg) => {
                tracing::error!("Identity configuration error: {}", msg);
                "A configuration error occurred".to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            error: self.error_code().to_string(),
            message,
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Result type alias for identity API operations.
pub type ApiResult<T> = Result<T, IdentityError>;
