//! # Proof Verifier
//!
//! Verifies the compact token in `proof.jwt` against key material resolved
//! from the signer's DID, with a two-tier fallback:
//!
//! 1. Cryptographic verification through the [`SignatureVerifier`]
//!    capability. Success yields [`ProofOutcome::Verified`].
//! 2. On any verification failure, an unsigned decode of the payload
//!    segment. Success yields [`ProofOutcome::Unverified`] so the embedded
//!    hash can still characterize the tampering.
//! 3. If even that decode fails, [`ProofOutcome::Undecodable`].
//!
//! [`JwtVerifier`] is the default signature verifier. It resolves the
//! `iss` DID, selects verification methods (restricted by `kid` when the
//! header carries one) and checks `EdDSA`, `ES256K` and `ES256K-R`
//! signatures, including ES256K recovery against `blockchainAccountId`.
//! Time claims are checked with a configurable skew.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use vct_crypto::jws::{self, recover_secp256k1, verify_signature};
use vct_crypto::{ethereum, Algorithm, CompactJws, KeyCurve};
use vct_did::{DidResolver, KeyMaterial, VerificationMethod};

use crate::error::SignatureError;

/// Header and payload of a token whose signature verified.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedJwt {
    /// Decoded protected header.
    pub header: Value,
    /// Decoded payload.
    pub payload: Value,
}

/// The Signature Verifier capability: verify a token, resolving the
/// signer's key through `resolver`.
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    /// Verify `token`. When `audience` is given, a token `aud` must
    /// contain it.
    async fn verify(
        &self,
        token: &str,
        resolver: &dyn DidResolver,
        audience: Option<&str>,
    ) -> Result<VerifiedJwt, SignatureError>;
}

/// Result of the Proof Verifier.
#[derive(Debug, Clone, PartialEq)]
pub enum ProofOutcome {
    /// Signature and claims verified.
    Verified {
        /// Decoded header.
        header: Value,
        /// Decoded payload.
        payload: Value,
    },
    /// Verification failed but the payload decoded without verification.
    Unverified {
        /// Decoded header, if the header segment is readable.
        header: Option<Value>,
        /// Payload decoded without signature check.
        payload: Value,
        /// Why verification failed.
        error: String,
    },
    /// Verification failed and the payload could not be decoded either.
    Undecodable {
        /// Why verification failed.
        error: String,
        /// Why the unsigned decode failed.
        decode_error: String,
    },
}

impl ProofOutcome {
    /// Whether the signature verified.
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }

    /// The payload, verified or not.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Verified { payload, .. } | Self::Unverified { payload, .. } => Some(payload),
            Self::Undecodable { .. } => None,
        }
    }

    /// The header, verified or not.
    pub fn header(&self) -> Option<&Value> {
        match self {
            Self::Verified { header, .. } => Some(header),
            Self::Unverified { header, .. } => header.as_ref(),
            Self::Undecodable { .. } => None,
        }
    }

    /// The verification error, if verification failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Verified { .. } => None,
            Self::Unverified { error, .. } | Self::Undecodable { error, .. } => Some(error),
        }
    }
}

/// Runs a [`SignatureVerifier`] and applies the fallback decode.
#[derive(Clone)]
pub struct ProofVerifier {
    signatures: Arc<dyn SignatureVerifier>,
    resolver: Arc<dyn DidResolver>,
    check_audience: bool,
}

impl std::fmt::Debug for ProofVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofVerifier")
            .field("check_audience", &self.check_audience)
            .finish_non_exhaustive()
    }
}

impl ProofVerifier {
    /// Create a proof verifier.
    pub fn new(
        signatures: Arc<dyn SignatureVerifier>,
        resolver: Arc<dyn DidResolver>,
        check_audience: bool,
    ) -> Self {
        Self {
            signatures,
            resolver,
            check_audience,
        }
    }

    /// Verify `token` as signed by `expected_did`.
    pub async fn verify(&self, token: &str, expected_did: &str) -> ProofOutcome {
        let audience = self.check_audience.then_some(expected_did);
        let failure = match self
            .signatures
            .verify(token, self.resolver.as_ref(), audience)
            .await
        {
            Ok(verified) => match verified.payload.get("iss").and_then(Value::as_str) {
                Some(iss) if did_of(iss) != did_of(expected_did) => {
                    SignatureError::Claims(format!(
                        "JWT issuer {iss} does not match credential issuer {expected_did}"
                    ))
                }
                _ => {
                    return ProofOutcome::Verified {
                        header: verified.header,
                        payload: verified.payload,
                    }
                }
            },
            Err(err) => err,
        };
        fallback_decode(token, failure.to_string())
    }
}

/// `did` with any `#fragment` removed.
fn did_of(did_url: &str) -> &str {
    did_url.split('#').next().unwrap_or(did_url)
}

fn fallback_decode(token: &str, error: String) -> ProofOutcome {
    match jws::decode_payload_unverified(token) {
        Ok(payload) => ProofOutcome::Unverified {
            header: jws::decode_header_unverified(token).ok(),
            payload,
            error,
        },
        Err(decode_err) => ProofOutcome::Undecodable {
            error,
            decode_error: decode_err.to_string(),
        },
    }
}

/// Default [`SignatureVerifier`] for compact JWTs signed by DID keys.
#[derive(Debug, Clone)]
pub struct JwtVerifier {
    clock_skew: Duration,
    fixed_now: Option<DateTime<Utc>>,
}

impl Default for JwtVerifier {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CLOCK_SKEW)
    }
}

impl JwtVerifier {
    /// Create a verifier tolerating `clock_skew` on time claims.
    pub fn new(clock_skew: Duration) -> Self {
        Self {
            clock_skew,
            fixed_now: None,
        }
    }

    /// Evaluate time claims at `now` instead of the system clock.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    fn now(&self) -> i64 {
        self.fixed_now.unwrap_or_else(Utc::now).timestamp()
    }

    fn check_time_claims(&self, payload: &Value) -> Result<(), SignatureError> {
        let now = self.now();
        let skew = i64::try_from(self.clock_skew.as_secs()).unwrap_or(i64::MAX);
        let claim = |name: &str| payload.get(name).and_then(Value::as_f64).map(|v| v as i64);

        if let Some(nbf) = claim("nbf") {
            if nbf > now.saturating_add(skew) {
                return Err(SignatureError::Claims(format!(
                    "JWT not valid before nbf: {nbf}"
                )));
            }
        } else if let Some(iat) = claim("iat") {
            if iat > now.saturating_add(skew) {
                return Err(SignatureError::Claims(format!(
                    "JWT not valid yet (issued in the future) iat: {iat}"
                )));
            }
        }
        if let Some(exp) = claim("exp") {
            if exp <= now.saturating_sub(skew) {
                return Err(SignatureError::Claims(format!(
                    "JWT has expired: exp: {exp}, now: {now}"
                )));
            }
        }
        Ok(())
    }

    fn check_audience(payload: &Value, audience: Option<&str>) -> Result<(), SignatureError> {
        let Some(aud) = payload.get("aud") else {
            return Ok(());
        };
        let Some(expected) = audience else {
            return Err(SignatureError::Claims(
                "JWT audience is required but no audience was configured".to_string(),
            ));
        };
        let matched = match aud {
            Value::String(s) => s == expected,
            Value::Array(items) => items.iter().any(|i| i.as_str() == Some(expected)),
            _ => false,
        };
        if matched {
            Ok(())
        } else {
            Err(SignatureError::Claims(format!(
                "JWT audience does not match {expected}"
            )))
        }
    }
}

#[async_trait]
impl SignatureVerifier for JwtVerifier {
    async fn verify(
        &self,
        token: &str,
        resolver: &dyn DidResolver,
        audience: Option<&str>,
    ) -> Result<VerifiedJwt, SignatureError> {
        let jws = CompactJws::parse(token)?;
        let header = jws.header()?;
        let payload = jws.payload()?;
        let alg = jws.algorithm()?;
        let signature = jws.signature()?;

        let iss = payload
            .get("iss")
            .and_then(Value::as_str)
            .ok_or_else(|| SignatureError::Claims("JWT iss is required".to_string()))?;
        let signer_did = did_of(iss);

        let resolution = resolver.resolve(signer_did).await?;
        let document = resolution.did_document;

        let candidates: Vec<&VerificationMethod> =
            match header.get("kid").and_then(Value::as_str) {
                Some(kid) => document.find_method(kid).into_iter().collect(),
                None => document.signing_methods(),
            };
        if candidates.is_empty() {
            return Err(SignatureError::InvalidSignature(format!(
                "no verification method of {signer_did} is usable"
            )));
        }

        let signing_input = jws.signing_input();
        let matched = candidates
            .iter()
            .find(|vm| method_verifies(vm, alg, signing_input.as_bytes(), &signature));
        let Some(vm) = matched else {
            return Err(SignatureError::InvalidSignature(format!(
                "no verification method of {signer_did} matches the {alg} signature"
            )));
        };
        tracing::debug!(method = %vm.id, %alg, "signature verified");

        self.check_time_claims(&payload)?;
        Self::check_audience(&payload, audience)?;

        Ok(VerifiedJwt { header, payload })
    }
}

fn method_verifies(vm: &VerificationMethod, alg: Algorithm, input: &[u8], signature: &[u8]) -> bool {
    match vm.key_material() {
        Ok(KeyMaterial::PublicKey(key)) => {
            key.curve() == alg.curve() && verify_signature(alg, input, signature, &key).is_ok()
        }
        Ok(KeyMaterial::Account(account)) => {
            alg.curve() == KeyCurve::Secp256k1
                && recover_secp256k1(alg, input, signature)
                    .map(|keys| {
                        keys.iter().any(|k| {
                            ethereum::account_matches(&account, &ethereum::address_from_key(k))
                        })
                    })
                    .unwrap_or(false)
        }
        Err(err) => {
            tracing::debug!(method = %vm.id, error = %err, "skipping verification method");
            false
        }
    }
}
