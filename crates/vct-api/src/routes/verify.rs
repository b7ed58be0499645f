//! # Verification Endpoint
//!
//! `POST /verify` with a `multipart/form-data` body whose `vc` file part
//! holds the credential JSON. Responds with the verification report, or an
//! [`AppError`] body for fatal failures.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use vct_verify::VerificationReport;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

/// Name of the multipart field carrying the credential.
pub const UPLOAD_FIELD: &str = "vc";

/// OpenAPI schema of the `POST /verify` multipart body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyUpload {
    /// The credential JSON file.
    #[schema(value_type = String, format = Binary)]
    pub vc: Vec<u8>,
}

/// OpenAPI schema of the verification report.
///
/// Mirrors the serialized shape of [`VerificationReport`].
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReportSchema {
    /// Whether the credential passed the structural schema check.
    pub valid_structure: bool,
    /// Schema violations (`instancePath`, `keyword`, `message`).
    #[schema(value_type = Vec<Object>)]
    pub structure_issues: Vec<serde_json::Value>,
    /// Resolution result, or `{ "error", "message" }` on failure.
    #[schema(value_type = Object)]
    pub did_resolution: serde_json::Value,
    /// Whether the proof JWT signature verified against the issuer.
    pub jwt_verified: bool,
    /// Decoded JWT header.
    #[schema(value_type = Option<Object>)]
    pub jwt_header: Option<serde_json::Value>,
    /// Decoded JWT payload.
    #[schema(value_type = Option<Object>)]
    pub jwt_payload: Option<serde_json::Value>,
    /// Signature verification failure, or the no-proof sentinel.
    pub jwt_error: Option<String>,
    /// Set when the JWT could not be decoded at all.
    pub jwt_decode_error: Option<String>,
    /// `credentialHash` claim of the JWT payload.
    pub embedded_hash: Option<String>,
    /// SHA-256 of the credential's `credentialSubject`.
    pub calculated_hash: Option<String>,
    /// Hash comparison result; `null` when no comparison took place.
    pub credential_hash_check: Option<bool>,
    /// Field-level changes between the signed and presented subject.
    #[schema(value_type = Option<Object>)]
    pub tamper_diff: Option<serde_json::Value>,
}

/// Verification router.
pub fn router() -> Router<AppState> {
    Router::new().route("/verify", post(verify))
}

/// Verify an uploaded credential.
#[utoipa::path(
    post,
    path = "/verify",
    request_body(content = VerifyUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Verification report", body = VerificationReportSchema),
        (status = 400, description = "Missing upload, malformed JSON or non-DID issuer", body = ErrorBody),
        (status = 413, description = "Upload exceeds the size limit", body = ErrorBody),
        (status = 500, description = "Internal pipeline failure", body = ErrorBody),
    ),
    tag = "verify"
)]
async fn verify(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VerificationReport>, AppError> {
    let Ok(mut multipart) = multipart else {
        return Err(AppError::MissingFile);
    };

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            upload = Some(field.bytes().await?);
            break;
        }
    }
    let bytes = upload.ok_or(AppError::MissingFile)?;
    tracing::debug!(bytes = bytes.len(), "credential uploaded");

    let report = state.orchestrator.verify_bytes(&bytes).await?;
    state.metrics.record_verification(&report);
    Ok(Json(report))
}
