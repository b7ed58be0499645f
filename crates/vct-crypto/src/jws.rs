//! # Compact JWS
//!
//! Splitting, decoding, signing and verification of compact JWS tokens
//! (`base64url(header).base64url(payload).base64url(signature)`).
//!
//! ## Algorithms
//!
//! | `alg`      | Curve     | Signature bytes                          |
//! |------------|-----------|------------------------------------------|
//! | `EdDSA`    | Ed25519   | 64                                       |
//! | `ES256K`   | secp256k1 | 64 (`r || s`), SHA-256 prehash           |
//! | `ES256K-R` | secp256k1 | 65 (`r || s || recovery id`), SHA-256     |
//!
//! secp256k1 signatures are normalized to low-S before verification.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::Signer as _;
use k256::ecdsa::signature::{Signer as _, Verifier as _};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::JwsError;
use crate::keys::{KeyCurve, PublicKey};

/// Signature algorithm named by the JWS `alg` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Ed25519 signatures.
    EdDSA,
    /// secp256k1 ECDSA over SHA-256.
    ES256K,
    /// secp256k1 ECDSA over SHA-256 with an appended recovery id.
    ES256KR,
}

impl Algorithm {
    /// Parse an `alg` header value. `Ed25519` is accepted as an alias of
    /// `EdDSA`.
    pub fn from_name(name: &str) -> Result<Self, JwsError> {
        match name {
            "EdDSA" | "Ed25519" => Ok(Self::EdDSA),
            "ES256K" => Ok(Self::ES256K),
            "ES256K-R" => Ok(Self::ES256KR),
            other => Err(JwsError::UnsupportedAlgorithm(other.to_string())),
        }
    }

    /// Canonical `alg` header value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EdDSA => "EdDSA",
            Self::ES256K => "ES256K",
            Self::ES256KR => "ES256K-R",
        }
    }

    /// Curve of keys usable with this algorithm.
    pub fn curve(&self) -> KeyCurve {
        match self {
            Self::EdDSA => KeyCurve::Ed25519,
            Self::ES256K | Self::ES256KR => KeyCurve::Secp256k1,
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compact JWS split into its three encoded segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactJws<'a> {
    header: &'a str,
    payload: &'a str,
    signature: &'a str,
}

impl<'a> CompactJws<'a> {
    /// Split a token into exactly three dot-separated segments.
    pub fn parse(token: &'a str) -> Result<Self, JwsError> {
        let mut parts = token.trim().split('.');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(header), Some(payload), Some(signature), None)
                if !header.is_empty() && !payload.is_empty() =>
            {
                Ok(Self {
                    header,
                    payload,
                    signature,
                })
            }
            _ => Err(JwsError::Malformed(
                "expected three dot-separated segments".to_string(),
            )),
        }
    }

    /// Decoded protected header.
    pub fn header(&self) -> Result<Value, JwsError> {
        decode_json_segment(self.header, "header")
    }

    /// Decoded payload.
    pub fn payload(&self) -> Result<Value, JwsError> {
        decode_json_segment(self.payload, "payload")
    }

    /// Raw signature bytes.
    pub fn signature(&self) -> Result<Vec<u8>, JwsError> {
        decode_segment(self.signature, "signature")
    }

    /// The bytes covered by the signature: `header.payload` as ASCII.
    pub fn signing_input(&self) -> String {
        format!("{}.{}", self.header, self.payload)
    }

    /// The `alg` named in the header.
    pub fn algorithm(&self) -> Result<Algorithm, JwsError> {
        let header = self.header()?;
        let alg = header
            .get("alg")
            .and_then(Value::as_str)
            .ok_or_else(|| JwsError::Malformed("header has no \"alg\"".to_string()))?;
        Algorithm::from_name(alg)
    }
}

/// Decode the payload segment without checking the signature.
///
/// Only the second dot-separated segment needs to be well formed; the
/// header and signature may be missing or corrupt.
pub fn decode_payload_unverified(token: &str) -> Result<Value, JwsError> {
    let segment = token
        .trim()
        .split('.')
        .nth(1)
        .ok_or_else(|| JwsError::Malformed("token has no payload segment".to_string()))?;
    decode_json_segment(segment, "payload")
}

/// Decode the header segment without checking the signature.
pub fn decode_header_unverified(token: &str) -> Result<Value, JwsError> {
    let segment = token.trim().split('.').next().unwrap_or_default();
    decode_json_segment(segment, "header")
}

fn decode_segment(segment: &str, name: &'static str) -> Result<Vec<u8>, JwsError> {
    URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|source| JwsError::SegmentEncoding {
            segment: name,
            source,
        })
}

fn decode_json_segment(segment: &str, name: &'static str) -> Result<Value, JwsError> {
    let bytes = decode_segment(segment, name)?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|e| JwsError::SegmentJson {
        segment: name,
        reason: e.to_string(),
    })?;
    if !value.is_object() {
        return Err(JwsError::SegmentJson {
            segment: name,
            reason: "not a JSON object".to_string(),
        });
    }
    Ok(value)
}

/// Verify a signature over `signing_input` with a known public key.
///
/// For `ES256K-R` the recovered key must equal `key`.
pub fn verify_signature(
    alg: Algorithm,
    signing_input: &[u8],
    signature: &[u8],
    key: &PublicKey,
) -> Result<(), JwsError> {
    match (alg, key) {
        (Algorithm::EdDSA, PublicKey::Ed25519(vk)) => {
            let sig = ed25519_dalek::Signature::from_slice(signature)
                .map_err(|e| JwsError::SignatureMalformed(e.to_string()))?;
            vk.verify_strict(signing_input, &sig)
                .map_err(|_| JwsError::SignatureMismatch)
        }
        (Algorithm::ES256K, PublicKey::Secp256k1(vk)) => {
            let sig = secp256k1_signature(signature)?;
            vk.verify(signing_input, &sig)
                .map_err(|_| JwsError::SignatureMismatch)
        }
        (Algorithm::ES256KR, PublicKey::Secp256k1(vk)) => {
            let recovered = recover_secp256k1(alg, signing_input, signature)?;
            if recovered.iter().any(|candidate| candidate == vk) {
                Ok(())
            } else {
                Err(JwsError::SignatureMismatch)
            }
        }
        (alg, key) => Err(JwsError::KeyAlgorithmMismatch {
            alg: alg.to_string(),
            key: key.curve().to_string(),
        }),
    }
}

/// Recover the candidate signer keys of a secp256k1 signature.
///
/// `ES256K-R` signatures carry their recovery id and yield one key. Plain
/// `ES256K` signatures yield every key that recovery ids 0 and 1 produce.
pub fn recover_secp256k1(
    alg: Algorithm,
    signing_input: &[u8],
    signature: &[u8],
) -> Result<Vec<k256::ecdsa::VerifyingKey>, JwsError> {
    let (sig_bytes, recovery_ids): (&[u8], Vec<u8>) = match alg {
        Algorithm::ES256KR => {
            if signature.len() != 65 {
                return Err(JwsError::SignatureMalformed(format!(
                    "ES256K-R signature must be 65 bytes, got {}",
                    signature.len()
                )));
            }
            // Ethereum-style ids are offset by 27.
            let id = match signature[64] {
                b @ 27..=28 => b - 27,
                b => b,
            };
            (&signature[..64], vec![id])
        }
        Algorithm::ES256K => (signature, vec![0, 1]),
        Algorithm::EdDSA => {
            return Err(JwsError::KeyAlgorithmMismatch {
                alg: alg.to_string(),
                key: KeyCurve::Secp256k1.to_string(),
            })
        }
    };

    let sig = secp256k1_signature(sig_bytes)?;
    let mut keys = Vec::with_capacity(recovery_ids.len());
    for id in recovery_ids {
        let Some(rec_id) = k256::ecdsa::RecoveryId::from_byte(id) else {
            return Err(JwsError::SignatureMalformed(format!(
                "invalid recovery id {id}"
            )));
        };
        if let Ok(key) = k256::ecdsa::VerifyingKey::recover_from_digest(
            Sha256::new_with_prefix(signing_input),
            &sig,
            rec_id,
        ) {
            keys.push(key);
        }
    }
    if keys.is_empty() {
        return Err(JwsError::SignatureMismatch);
    }
    Ok(keys)
}

fn secp256k1_signature(bytes: &[u8]) -> Result<k256::ecdsa::Signature, JwsError> {
    let sig = k256::ecdsa::Signature::from_slice(bytes)
        .map_err(|e| JwsError::SignatureMalformed(e.to_string()))?;
    Ok(sig.normalize_s().unwrap_or(sig))
}

/// A private key able to produce JWS signatures.
///
/// Does not implement `Debug` output of key bytes or `Serialize`.
pub enum SigningKey {
    /// Ed25519 signing key.
    Ed25519(ed25519_dalek::SigningKey),
    /// secp256k1 signing key.
    Secp256k1(k256::ecdsa::SigningKey),
}

impl SigningKey {
    /// Generate a random Ed25519 key.
    pub fn generate_ed25519() -> Self {
        Self::Ed25519(ed25519_dalek::SigningKey::generate(&mut rand_core::OsRng))
    }

    /// Generate a random secp256k1 key.
    pub fn generate_secp256k1() -> Self {
        Self::Secp256k1(k256::ecdsa::SigningKey::random(&mut rand_core::OsRng))
    }

    /// The matching public key.
    pub fn public_key(&self) -> PublicKey {
        match self {
            Self::Ed25519(sk) => PublicKey::Ed25519(sk.verifying_key()),
            Self::Secp256k1(sk) => PublicKey::Secp256k1(k256::ecdsa::VerifyingKey::from(sk)),
        }
    }

    /// Sign `payload` as a compact JWS.
    ///
    /// `extra_header` fields (for example `kid`) are merged into the
    /// protected header after `alg` and `typ`.
    pub fn sign_jws(
        &self,
        alg: Algorithm,
        payload: &Value,
        extra_header: Option<&Value>,
    ) -> Result<String, JwsError> {
        let mut header = serde_json::Map::new();
        header.insert("alg".to_string(), Value::from(alg.as_str()));
        header.insert("typ".to_string(), Value::from("JWT"));
        if let Some(Value::Object(extra)) = extra_header {
            for (k, v) in extra {
                header.insert(k.clone(), v.clone());
            }
        }

        let encode_json = |value: &Value| -> Result<String, JwsError> {
            let bytes = serde_json::to_vec(value).map_err(|e| JwsError::SegmentJson {
                segment: "payload",
                reason: e.to_string(),
            })?;
            Ok(URL_SAFE_NO_PAD.encode(bytes))
        };
        let signing_input = format!(
            "{}.{}",
            encode_json(&Value::Object(header))?,
            encode_json(payload)?
        );
        let signature = self.sign_bytes(alg, signing_input.as_bytes())?;
        Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
    }

    fn sign_bytes(&self, alg: Algorithm, data: &[u8]) -> Result<Vec<u8>, JwsError> {
        match (alg, self) {
            (Algorithm::EdDSA, Self::Ed25519(sk)) => Ok(sk.sign(data).to_bytes().to_vec()),
            (Algorithm::ES256K, Self::Secp256k1(sk)) => {
                let sig: k256::ecdsa::Signature = sk.sign(data);
                Ok(sig.to_bytes().to_vec())
            }
            (Algorithm::ES256KR, Self::Secp256k1(sk)) => {
                let (sig, rec_id) = sk
                    .sign_digest_recoverable(Sha256::new_with_prefix(data))
                    .map_err(|e| JwsError::SignatureMalformed(e.to_string()))?;
                let mut out = sig.to_bytes().to_vec();
                out.push(rec_id.to_byte());
                Ok(out)
            }
            (alg, key) => Err(JwsError::KeyAlgorithmMismatch {
                alg: alg.to_string(),
                key: key.public_key().curve().to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey::{}(<private>)", self.public_key().curve())
    }
}
