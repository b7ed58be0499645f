//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Every failure leaves the service in the same body shape:
//!
//! ```json
//! { "valid": false, "error": "Invalid JSON format", "code": "MALFORMED_INPUT", "details": "..." }
//! ```
//!
//! Client errors map to 400 (413 for oversized uploads), pipeline failures
//! to 500. Non-fatal verification failures never reach this type; they are
//! fields of the verification report.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use vct_verify::VerifyError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ErrorBody {
    /// Always `false`; lets clients branch on the same field as a report.
    pub valid: bool,
    /// Human-readable message.
    pub error: String,
    /// Machine-readable error code (e.g. `"MISSING_ISSUER"`).
    pub code: String,
    /// Underlying cause, when one is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Application-level error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The request carried no `vc` file part (400).
    #[error("No file uploaded")]
    MissingFile,

    /// The multipart body could not be read (400).
    #[error("Invalid multipart upload")]
    Multipart(String),

    /// The upload exceeds the configured size limit (413).
    #[error("Upload exceeds the size limit")]
    PayloadTooLarge,

    /// A fatal verification failure.
    #[error(transparent)]
    Verify(#[from] VerifyError),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::MissingFile => (StatusCode::BAD_REQUEST, "MISSING_FILE"),
            Self::Multipart(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            Self::Verify(err @ VerifyError::Internal(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.code())
            }
            Self::Verify(err) => (StatusCode::BAD_REQUEST, err.code()),
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::Multipart(details) => Some(details.clone()),
            Self::Verify(err) => err.details().map(str::to_string),
            Self::MissingFile | Self::PayloadTooLarge => None,
        }
    }

    /// Response body for this error.
    pub fn body(&self) -> ErrorBody {
        let (_, code) = self.status_and_code();
        ErrorBody {
            valid: false,
            error: self.to_string(),
            code: code.to_string(),
            details: self.details(),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            Self::Multipart(err.body_text())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, _) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, details = ?self.details(), "server error");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}
