//! # Verification Orchestrator
//!
//! Sequences one verification:
//!
//! 1. Parse the upload. Fatal on failure ([`VerifyError::MalformedInput`]).
//! 2. Validate structure. Recorded, never fatal.
//! 3. Extract the issuer DID. Fatal when absent or not a DID
//!    ([`VerifyError::MissingIssuer`]).
//! 4. Resolve the issuer DID. Recorded, never fatal.
//! 5. With a `proof.jwt`: run the [`ProofVerifier`], compare the payload's
//!    `credentialHash` with the uploaded subject's hash, and on a mismatch
//!    diff the payload subject against the uploaded one. Without a proof
//!    the report keeps its "no proof" sentinels.
//!
//! Collaborators are injected at construction and shared across requests;
//! each call builds a fresh report.

use std::sync::Arc;

use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;
use vct_did::DidResolver;
use vct_schema::StructuralValidator;

use crate::config::VerifierConfig;
use crate::credential::{credential_subject, issuer_did, proof_jwt};
use crate::diff::diff;
use crate::error::VerifyError;
use crate::hash::check_subject_hash;
use crate::proof::{JwtVerifier, ProofOutcome, ProofVerifier, SignatureVerifier};
use crate::report::{DidResolution, VerificationReport};

/// Runs the verification pipeline.
#[derive(Clone)]
pub struct VerificationOrchestrator {
    config: VerifierConfig,
    validator: Arc<StructuralValidator>,
    resolver: Arc<dyn DidResolver>,
    proofs: ProofVerifier,
}

impl std::fmt::Debug for VerificationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationOrchestrator")
            .field("config", &self.config)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

impl VerificationOrchestrator {
    /// Create an orchestrator from its collaborators.
    pub fn new(
        config: VerifierConfig,
        validator: Arc<StructuralValidator>,
        resolver: Arc<dyn DidResolver>,
        signatures: Arc<dyn SignatureVerifier>,
    ) -> Self {
        let proofs = ProofVerifier::new(signatures, resolver.clone(), config.check_audience);
        Self {
            config,
            validator,
            resolver,
            proofs,
        }
    }

    /// Create an orchestrator using [`JwtVerifier`] with the configured skew.
    pub fn with_default_verifier(
        config: VerifierConfig,
        validator: Arc<StructuralValidator>,
        resolver: Arc<dyn DidResolver>,
    ) -> Self {
        let signatures = Arc::new(JwtVerifier::new(config.clock_skew));
        Self::new(config, validator, resolver, signatures)
    }

    /// Configuration in effect.
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify raw upload bytes.
    pub async fn verify_bytes(&self, bytes: &[u8]) -> Result<VerificationReport, VerifyError> {
        let document: Value = serde_json::from_slice(bytes)
            .map_err(|e| VerifyError::MalformedInput(e.to_string()))?;
        self.verify_document(&document).await
    }

    /// Verify a parsed credential.
    pub async fn verify_document(&self, document: &Value) -> Result<VerificationReport, VerifyError> {
        let span = tracing::info_span!(
            "verify_credential",
            request_id = %Uuid::new_v4(),
            issuer = tracing::field::Empty,
        );
        self.run(document).instrument(span).await
    }

    async fn run(&self, document: &Value) -> Result<VerificationReport, VerifyError> {
        let structure = self.validator.validate(document);
        if !structure.valid {
            tracing::info!(issues = structure.issues.len(), "credential structure invalid");
        }

        let issuer = issuer_did(document).ok_or(VerifyError::MissingIssuer)?;
        tracing::Span::current().record("issuer", issuer);

        let did_resolution = match self.resolver.resolve(issuer).await {
            Ok(result) => {
                tracing::info!(did = %issuer, "DID resolution succeeded");
                DidResolution::Success(Box::new(result))
            }
            Err(err) => {
                tracing::error!(did = %issuer, error = %err, "DID resolution failed");
                DidResolution::Failure {
                    message: err.to_string(),
                }
            }
        };

        let mut report = VerificationReport::new(structure.valid, structure.issues, did_resolution);

        if let Some(token) = proof_jwt(document) {
            let outcome = self.proofs.verify(token, issuer).await;
            self.apply_proof(&mut report, document, outcome)?;
        }

        tracing::debug!(
            report = %serde_json::to_string(&report).unwrap_or_default(),
            "verification finished"
        );
        Ok(report)
    }

    fn apply_proof(
        &self,
        report: &mut VerificationReport,
        document: &Value,
        outcome: ProofOutcome,
    ) -> Result<(), VerifyError> {
        report.jwt_verified = outcome.is_verified();
        report.jwt_error = outcome.error().map(str::to_string);
        if let Some(error) = outcome.error() {
            tracing::error!(%error, "JWT signature verification failed");
        }

        let payload = match outcome {
            ProofOutcome::Verified { header, payload } => {
                report.jwt_header = Some(header);
                payload
            }
            ProofOutcome::Unverified { header, payload, .. } => {
                report.jwt_header = header;
                payload
            }
            ProofOutcome::Undecodable { decode_error, .. } => {
                tracing::warn!(error = %decode_error, "could not decode JWT payload");
                report.jwt_decode_error = Some(decode_error);
                report.credential_hash_check = None;
                return Ok(());
            }
        };

        let order = self.config.hash_key_order;
        let uploaded = credential_subject(document);
        let check = check_subject_hash(&payload, uploaded, order)?;
        report.embedded_hash = check.embedded_hash;
        report.calculated_hash = Some(check.calculated_hash);
        report.credential_hash_check = Some(check.matches);

        if !check.matches {
            let original = credential_subject(&payload).unwrap_or(&Value::Null);
            let tamper = diff(original, uploaded.unwrap_or(&Value::Null), order);
            tracing::warn!(
                added = tamper.added.len(),
                removed = tamper.removed.len(),
                changed = tamper.changed.len(),
                diff = %serde_json::to_string(&tamper).unwrap_or_default(),
                "credential hash mismatch"
            );
            report.tamper_diff = Some(tamper);
        }

        report.jwt_payload = Some(payload);
        Ok(())
    }
}
