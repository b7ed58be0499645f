//! # Verification Report
//!
//! The sole output of a verification. Fields are filled in pipeline order
//! by the orchestrator; a stage that cannot run leaves an explicit sentinel
//! (`null` or an explanatory error) rather than omitting its field.
//!
//! `jwtError`, `jwtDecodeError` and `tamperDiff` are present only when they
//! carry information.

use serde::{Serialize, Serializer};
use serde_json::Value;
use vct_did::ResolutionResult;
use vct_schema::StructureIssue;

use crate::diff::TamperDiff;

/// Error string reported when a credential carries no `proof.jwt`.
pub const NO_PROOF_ERROR: &str = "No JWT proof provided.";

/// Error string of a failed resolution wrapper.
pub const RESOLUTION_FAILED: &str = "Failed to resolve DID";

/// Outcome of resolving the issuer DID.
#[derive(Debug, Clone, PartialEq)]
pub enum DidResolution {
    /// The resolver returned a document.
    Success(Box<ResolutionResult>),
    /// The resolver failed; the pipeline continued.
    Failure {
        /// Resolver error message.
        message: String,
    },
}

impl DidResolution {
    /// Whether resolution succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl Serialize for DidResolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct FailureBody<'a> {
            error: &'static str,
            message: &'a str,
        }

        match self {
            Self::Success(result) => result.serialize(serializer),
            Self::Failure { message } => FailureBody {
                error: RESOLUTION_FAILED,
                message,
            }
            .serialize(serializer),
        }
    }
}

/// Aggregated result of verifying one credential.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    /// Whether the credential conforms to the structural schema.
    pub valid_structure: bool,
    /// Schema violations, in evaluation order.
    pub structure_issues: Vec<StructureIssue>,
    /// Issuer DID resolution outcome.
    pub did_resolution: DidResolution,
    /// Whether the proof's signature and claims verified.
    pub jwt_verified: bool,
    /// Decoded token header, verified or best effort.
    pub jwt_header: Option<Value>,
    /// Decoded token payload, verified or best effort.
    pub jwt_payload: Option<Value>,
    /// Why verification failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_error: Option<String>,
    /// Why the unsigned fallback decode failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_decode_error: Option<String>,
    /// `credentialHash` carried by the payload.
    pub embedded_hash: Option<String>,
    /// Hash recomputed from the uploaded subject.
    pub calculated_hash: Option<String>,
    /// Hash comparison; `None` when no comparison was possible.
    pub credential_hash_check: Option<bool>,
    /// Field-level differences, present only on a hash mismatch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tamper_diff: Option<TamperDiff>,
}

impl VerificationReport {
    /// A report holding the structural check and resolution outcome, with
    /// every proof-dependent field at its "no proof" sentinel.
    pub fn new(
        valid_structure: bool,
        structure_issues: Vec<StructureIssue>,
        did_resolution: DidResolution,
    ) -> Self {
        Self {
            valid_structure,
            structure_issues,
            did_resolution,
            jwt_verified: false,
            jwt_header: None,
            jwt_payload: None,
            jwt_error: Some(NO_PROOF_ERROR.to_string()),
            jwt_decode_error: None,
            embedded_hash: None,
            calculated_hash: None,
            credential_hash_check: None,
            tamper_diff: None,
        }
    }

    /// Whether the tamper check found the subject unchanged.
    pub fn is_untampered(&self) -> bool {
        self.credential_hash_check == Some(true)
    }
}
