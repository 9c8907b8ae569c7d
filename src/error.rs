//! Relay error types with HTTP status code mapping.
//!
//! [`RelayError`] is the central error type. Each variant maps to a specific
//! HTTP status code and a structured JSON error response.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "room not found: 3f0c...",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status               |
/// |-----------|-----------------|---------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request           |
/// | 2000–2999 | Not Found       | 404 Not Found             |
/// | 3000–3999 | Server          | 500 / 503                 |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Malformed identifier or request payload.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The WebSocket handshake could not be performed.
    #[error("could not upgrade to websocket connection: {0}")]
    UpgradeFailed(String),

    /// Room with the given ID does not exist.
    #[error("room not found: {0}")]
    RoomNotFound(uuid::Uuid),

    /// Message with the given ID does not exist in the room.
    #[error("message not found: {0}")]
    MessageNotFound(uuid::Uuid),

    /// Storage backend failure.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidInput(_) => 1001,
            Self::UpgradeFailed(_) => 1002,
            Self::RoomNotFound(_) => 2001,
            Self::MessageNotFound(_) => 2002,
            Self::Internal(_) => 3000,
            Self::Unavailable(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::UpgradeFailed(_) => StatusCode::BAD_REQUEST,
            Self::RoomNotFound(_) | Self::MessageNotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for RelayError {
    fn from(err: sqlx::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<JsonRejection> for RelayError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(
            RelayError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::UpgradeFailed("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::RoomNotFound(id).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RelayError::MessageNotFound(id).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn store_errors_are_unavailable() {
        let err = RelayError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), 3001);
    }

    #[test]
    fn response_carries_status() {
        let response = RelayError::RoomNotFound(uuid::Uuid::new_v4()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
