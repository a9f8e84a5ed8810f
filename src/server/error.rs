//! server::error
//!
//! Mapping from vault errors to HTTP responses.
//!
//! | Error        | Status | Body               |
//! |--------------|--------|--------------------|
//! | `Validation` | 400    | `{error}`          |
//! | `NotFound`   | 404    | `{error, details}` |
//! | `Store`      | 502    | `{error, details}` |
//!
//! `details` is the human-readable error message. Nothing else from the
//! store reaches the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::vault::SecretError;

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// An error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    /// 400 with a bare message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: message.into(),
                details: None,
            },
        }
    }

    /// Map a vault error. `summary` becomes the `error` field for not-found
    /// and store failures.
    pub fn from_secret(err: SecretError, summary: impl Into<String>) -> Self {
        let status = match &err {
            SecretError::Validation(message) => return Self::bad_request(message.clone()),
            SecretError::NotFound(_) => StatusCode::NOT_FOUND,
            SecretError::Store(e) => {
                tracing::warn!(error = %e, "object store failure");
                StatusCode::BAD_GATEWAY
            }
        };
        Self {
            status,
            body: ErrorBody {
                error: summary.into(),
                details: Some(err.to_string()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
