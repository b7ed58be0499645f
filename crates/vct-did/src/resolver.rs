//! # Resolver Capability
//!
//! [`DidResolver`] is the seam between the verification pipeline and any
//! DID backend. A resolver either yields a W3C DID resolution result or
//! fails with a [`ResolutionError`]. Resolution metadata errors returned by
//! a backend are surfaced as failures, never as a "successful" result with
//! an error inside.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::document::DidDocument;

/// Media type of a DID document in JSON-LD representation.
pub const TYPE_DID_LD_JSON: &str = "application/did+ld+json";

/// Resolution metadata error codes (W3C DID Core).
pub const ERROR_INVALID_DID: &str = "invalidDid";
/// The DID does not exist.
pub const ERROR_NOT_FOUND: &str = "notFound";
/// The resolver does not support the DID method.
pub const ERROR_METHOD_NOT_SUPPORTED: &str = "methodNotSupported";

/// Why a DID could not be resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The identifier is not a syntactically valid DID.
    #[error("invalid DID: {0}")]
    InvalidDid(String),

    /// No resolver is registered for the DID method.
    #[error("DID method not supported: {0}")]
    MethodNotSupported(String),

    /// The backend reports that the DID does not exist.
    #[error("DID not found: {0}")]
    NotFound(String),

    /// The backend could not be reached or answered with a transport error.
    #[error("resolver request failed: {0}")]
    Transport(String),

    /// The backend answered with something that is not a resolution result.
    #[error("invalid resolver response: {0}")]
    InvalidResponse(String),

    /// The backend returned a resolution metadata error.
    #[error("resolver returned {code}: {message}")]
    Backend {
        /// Error code from `didResolutionMetadata.error`.
        code: String,
        /// Human-readable detail, if the backend supplied one.
        message: String,
    },
}

impl ResolutionError {
    /// Resolution metadata error code for this failure.
    pub fn code(&self) -> &str {
        match self {
            Self::InvalidDid(_) => ERROR_INVALID_DID,
            Self::MethodNotSupported(_) => ERROR_METHOD_NOT_SUPPORTED,
            Self::NotFound(_) => ERROR_NOT_FOUND,
            Self::Transport(_) | Self::InvalidResponse(_) => "internalError",
            Self::Backend { code, .. } => code,
        }
    }

    /// Map a metadata error code reported by a backend.
    pub fn from_metadata(did: &str, code: &str, message: Option<&str>) -> Self {
        match code {
            ERROR_INVALID_DID | "invalid-did" => Self::InvalidDid(did.to_string()),
            ERROR_NOT_FOUND | "not-found" => Self::NotFound(did.to_string()),
            ERROR_METHOD_NOT_SUPPORTED | "method-not-supported" => {
                Self::MethodNotSupported(did.to_string())
            }
            other => Self::Backend {
                code: other.to_string(),
                message: message.unwrap_or(did).to_string(),
            },
        }
    }
}

/// `didResolutionMetadata`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionMetadata {
    /// Error code, present only on failed resolutions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Media type of the returned representation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Any other metadata the backend returned.
    #[serde(flatten)]
    pub property_set: Map<String, Value>,
}

/// `didDocumentMetadata`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Creation timestamp as reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Last update timestamp as reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    /// Whether the DID has been deactivated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<bool>,
    /// Any other metadata the backend returned.
    #[serde(flatten)]
    pub property_set: Map<String, Value>,
}

/// A successful W3C DID resolution result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    /// The resolved document.
    pub did_document: DidDocument,
    /// Metadata about the resolution process.
    #[serde(default)]
    pub did_resolution_metadata: ResolutionMetadata,
    /// Metadata about the document.
    #[serde(default)]
    pub did_document_metadata: DocumentMetadata,
}

impl ResolutionResult {
    /// Wrap a document produced locally (static or derived) with a JSON-LD
    /// content type and empty document metadata.
    pub fn from_document(did_document: DidDocument) -> Self {
        Self {
            did_document,
            did_resolution_metadata: ResolutionMetadata {
                content_type: Some(TYPE_DID_LD_JSON.to_string()),
                ..ResolutionMetadata::default()
            },
            did_document_metadata: DocumentMetadata::default(),
        }
    }
}

/// Resolve a DID to its document.
///
/// Implementations must be safe to share across concurrent requests. A
/// single call makes a single attempt; retries and timeouts belong to the
/// implementation, never to callers.
#[async_trait]
pub trait DidResolver: Send + Sync {
    /// Resolve `did` to a resolution result.
    async fn resolve(&self, did: &str) -> Result<ResolutionResult, ResolutionError>;
}

#[async_trait]
impl<T: DidResolver + ?Sized> DidResolver for Arc<T> {
    async fn resolve(&self, did: &str) -> Result<ResolutionResult, ResolutionError> {
        (**self).resolve(did).await
    }
}
