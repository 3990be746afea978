//! HTTP error responses.
//!
//! Every failure is rendered as
//!
//! ```json
//! { "error": { "code": "ingest_error", "message": "Error: File not found." } }
//! ```
//!
//! | Code | Status | Cause |
//! |------|--------|-------|
//! | `bad_request` | 400 | malformed form, missing `file` or `query` |
//! | `ingest_error` | 422 | document could not be read or extracted |
//! | `provider_error` | 502 | generation or embedding backend failed |
//! | `timeout` | 504 | generation exceeded its deadline |
//! | `internal` | 500 | anything else |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use finqa_core::AppError;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

/// Error type that converts into an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "bad_request",
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let (status, code) = match &err {
            AppError::Ingest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "ingest_error"),
            AppError::Llm(_) => (StatusCode::BAD_GATEWAY, "provider_error"),
            AppError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };

        if status.is_server_error() {
            tracing::error!(code, "Request failed: {}", err);
        } else {
            tracing::warn!(code, "Request rejected: {}", err);
        }

        // Ingestion messages are user-facing; the rest keep their category prefix.
        let message = match err {
            AppError::Ingest(message) => message,
            other => other.to_string(),
        };

        Self {
            status,
            code,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::Ingest("x".into()), StatusCode::UNPROCESSABLE_ENTITY, "ingest_error"),
            (AppError::Llm("x".into()), StatusCode::BAD_GATEWAY, "provider_error"),
            (AppError::Timeout("x".into()), StatusCode::GATEWAY_TIMEOUT, "timeout"),
            (AppError::Knowledge("x".into()), StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            (AppError::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        ];

        for (err, status, code) in cases {
            let api = ApiError::from(err);
            assert_eq!(api.status(), status);
            assert_eq!(api.code(), code);
        }
    }

    #[test]
    fn test_ingest_message_is_unprefixed() {
        let api = ApiError::from(AppError::Ingest("Error: File not found.".into()));
        assert_eq!(api.message, "Error: File not found.");
    }

    #[test]
    fn test_bad_request() {
        let api = ApiError::bad_request("missing query");
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
        assert_eq!(api.code(), "bad_request");
    }
}
