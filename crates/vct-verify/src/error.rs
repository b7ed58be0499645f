//! # Verification Errors
//!
//! Only two pipeline stages are fatal: parsing the upload and extracting
//! the issuer DID, plus unexpected internal failures. Everything else
//! degrades into report fields. [`SignatureError`] is the failure type of
//! the Signature Verifier capability and never escapes the Proof Verifier.

use thiserror::Error;
use vct_crypto::JwsError;
use vct_did::ResolutionError;

/// Fatal verification failure.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The upload is not valid JSON.
    #[error("Invalid JSON format")]
    MalformedInput(String),

    /// The credential has no issuer, or the issuer is not a DID.
    #[error("Issuer must be a valid DID")]
    MissingIssuer,

    /// An unexpected failure inside the pipeline.
    #[error("Error processing file")]
    Internal(String),
}

impl VerifyError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "MALFORMED_INPUT",
            Self::MissingIssuer => "MISSING_ISSUER",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Underlying detail, when there is one.
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::MalformedInput(d) | Self::Internal(d) => Some(d),
            Self::MissingIssuer => None,
        }
    }
}

impl From<vct_core::CanonicalizationError> for VerifyError {
    fn from(err: vct_core::CanonicalizationError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Why a signed token could not be verified.
#[derive(Error, Debug)]
pub enum SignatureError {
    /// The token could not be parsed.
    #[error("invalid_jwt: {0}")]
    Token(#[from] JwsError),

    /// The signer DID could not be resolved.
    #[error("resolver_error: Unable to resolve DID document: {0}")]
    Resolution(#[from] ResolutionError),

    /// No verification method of the signer verifies the signature.
    #[error("invalid_signature: {0}")]
    InvalidSignature(String),

    /// Time, audience or issuer claims are unacceptable.
    #[error("invalid_claims: {0}")]
    Claims(String),
}
