//! # Public-Key Material
//!
//! [`PublicKey`] is the verification key extracted from a DID document.
//! DID documents publish keys in several encodings; each has a dedicated
//! constructor here:
//!
//! - `publicKeyJwk`: OKP / Ed25519 (`x`) and EC / secp256k1 (`x`, `y`).
//! - `publicKeyMultibase`: base58btc (`z` prefix) with a multicodec header
//!   (`0xed01` Ed25519, `0xe701` secp256k1).
//! - `publicKeyBase58` and `publicKeyHex`: raw key bytes, curve supplied by
//!   the verification method type.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde_json::Value;

use crate::error::CryptoError;

/// Multicodec varint prefix for an Ed25519 public key.
pub const MULTICODEC_ED25519_PUB: [u8; 2] = [0xed, 0x01];
/// Multicodec varint prefix for a compressed secp256k1 public key.
pub const MULTICODEC_SECP256K1_PUB: [u8; 2] = [0xe7, 0x01];

/// Elliptic curve of a verification key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCurve {
    /// Edwards25519, used by `EdDSA`.
    Ed25519,
    /// secp256k1, used by `ES256K` and `ES256K-R`.
    Secp256k1,
}

impl KeyCurve {
    /// JOSE curve name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519 => "Ed25519",
            Self::Secp256k1 => "secp256k1",
        }
    }
}

impl std::fmt::Display for KeyCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verification key on one of the supported curves.
#[derive(Clone, PartialEq, Eq)]
pub enum PublicKey {
    /// Ed25519 verifying key.
    Ed25519(ed25519_dalek::VerifyingKey),
    /// secp256k1 ECDSA verifying key.
    Secp256k1(k256::ecdsa::VerifyingKey),
}

impl PublicKey {
    /// Parse raw key bytes for a known curve.
    ///
    /// Ed25519 keys are 32 bytes. secp256k1 keys are SEC1 encoded, either
    /// compressed (33 bytes) or uncompressed (65 bytes).
    pub fn from_bytes(curve: KeyCurve, bytes: &[u8]) -> Result<Self, CryptoError> {
        match curve {
            KeyCurve::Ed25519 => {
                let arr: [u8; 32] = bytes.try_into().map_err(|_| {
                    CryptoError::KeyError(format!(
                        "Ed25519 key must be 32 bytes, got {}",
                        bytes.len()
                    ))
                })?;
                ed25519_dalek::VerifyingKey::from_bytes(&arr)
                    .map(Self::Ed25519)
                    .map_err(|e| CryptoError::KeyError(format!("invalid Ed25519 key: {e}")))
            }
            KeyCurve::Secp256k1 => k256::ecdsa::VerifyingKey::from_sec1_bytes(bytes)
                .map(Self::Secp256k1)
                .map_err(|e| CryptoError::KeyError(format!("invalid secp256k1 key: {e}"))),
        }
    }

    /// Parse a `publicKeyJwk` object.
    pub fn from_jwk(jwk: &Value) -> Result<Self, CryptoError> {
        let field = |name: &str| -> Result<Vec<u8>, CryptoError> {
            let s = jwk
                .get(name)
                .and_then(Value::as_str)
                .ok_or_else(|| CryptoError::Encoding(format!("JWK is missing \"{name}\"")))?;
            URL_SAFE_NO_PAD
                .decode(s.trim_end_matches('='))
                .map_err(|e| CryptoError::Encoding(format!("JWK \"{name}\": {e}")))
        };

        let kty = jwk.get("kty").and_then(Value::as_str).unwrap_or_default();
        let crv = jwk.get("crv").and_then(Value::as_str).unwrap_or_default();
        match (kty, crv) {
            ("OKP", "Ed25519") => Self::from_bytes(KeyCurve::Ed25519, &field("x")?),
            ("EC", "secp256k1") => {
                let x = field("x")?;
                let y = field("y")?;
                if x.len() != 32 || y.len() != 32 {
                    return Err(CryptoError::KeyError(
                        "secp256k1 JWK coordinates must be 32 bytes".to_string(),
                    ));
                }
                let mut sec1 = Vec::with_capacity(65);
                sec1.push(0x04);
                sec1.extend_from_slice(&x);
                sec1.extend_from_slice(&y);
                Self::from_bytes(KeyCurve::Secp256k1, &sec1)
            }
            _ => Err(CryptoError::UnsupportedKeyType(format!(
                "kty={kty:?} crv={crv:?}"
            ))),
        }
    }

    /// Parse a multibase (`z` + base58btc) multicodec-prefixed key.
    pub fn from_multibase(s: &str) -> Result<Self, CryptoError> {
        let encoded = s.strip_prefix('z').ok_or_else(|| {
            CryptoError::Encoding(format!("only base58btc multibase (z...) is supported: {s}"))
        })?;
        let bytes = decode_base58(encoded)?;
        if let Some(key) = bytes.strip_prefix(&MULTICODEC_ED25519_PUB) {
            Self::from_bytes(KeyCurve::Ed25519, key)
        } else if let Some(key) = bytes.strip_prefix(&MULTICODEC_SECP256K1_PUB) {
            Self::from_bytes(KeyCurve::Secp256k1, key)
        } else {
            Err(CryptoError::UnsupportedKeyType(format!(
                "unknown multicodec prefix {}",
                hex::encode(bytes.iter().take(2).copied().collect::<Vec<_>>())
            )))
        }
    }

    /// Parse a `publicKeyBase58` value.
    pub fn from_base58(curve: KeyCurve, s: &str) -> Result<Self, CryptoError> {
        Self::from_bytes(curve, &decode_base58(s)?)
    }

    /// Parse a `publicKeyHex` value. A leading `0x` is accepted.
    pub fn from_hex(curve: KeyCurve, s: &str) -> Result<Self, CryptoError> {
        let trimmed = s.trim().trim_start_matches("0x");
        let bytes = hex::decode(trimmed).map_err(|e| CryptoError::Encoding(e.to_string()))?;
        Self::from_bytes(curve, &bytes)
    }

    /// Curve of this key.
    pub fn curve(&self) -> KeyCurve {
        match self {
            Self::Ed25519(_) => KeyCurve::Ed25519,
            Self::Secp256k1(_) => KeyCurve::Secp256k1,
        }
    }

    /// Compact public-key bytes: 32 bytes for Ed25519, compressed SEC1 for
    /// secp256k1.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Ed25519(vk) => vk.to_bytes().to_vec(),
            Self::Secp256k1(vk) => k256::PublicKey::from(vk)
                .to_encoded_point(true)
                .as_bytes()
                .to_vec(),
        }
    }

    /// Multibase (`z` + base58btc) multicodec encoding, as used by `did:key`.
    pub fn to_multibase(&self) -> String {
        let prefix = match self {
            Self::Ed25519(_) => MULTICODEC_ED25519_PUB,
            Self::Secp256k1(_) => MULTICODEC_SECP256K1_PUB,
        };
        let mut bytes = prefix.to_vec();
        bytes.extend(self.to_bytes());
        format!("z{}", bs58::encode(bytes).into_string())
    }

    /// The JWK form of this key.
    pub fn to_jwk(&self) -> Value {
        match self {
            Self::Ed25519(vk) => serde_json::json!({
                "kty": "OKP",
                "crv": "Ed25519",
                "x": URL_SAFE_NO_PAD.encode(vk.to_bytes()),
            }),
            Self::Secp256k1(vk) => {
                let point = k256::PublicKey::from(vk).to_encoded_point(false);
                let xy = point.as_bytes();
                serde_json::json!({
                    "kty": "EC",
                    "crv": "secp256k1",
                    "x": URL_SAFE_NO_PAD.encode(&xy[1..33]),
                    "y": URL_SAFE_NO_PAD.encode(&xy[33..65]),
                })
            }
        }
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = self.to_bytes();
        write!(
            f,
            "PublicKey::{}({}...)",
            self.curve(),
            hex::encode(&bytes[..bytes.len().min(4)])
        )
    }
}

fn decode_base58(s: &str) -> Result<Vec<u8>, CryptoError> {
    bs58::decode(s)
        .into_vec()
        .map_err(|e| CryptoError::Encoding(format!("invalid base58: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // Test vector from the W3C did:key method registry.
    const ED25519_MULTIBASE: &str = "z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK";

    #[test]
    fn multibase_ed25519_roundtrip() {
        let key = PublicKey::from_multibase(ED25519_MULTIBASE).unwrap();
        assert_eq!(key.curve(), KeyCurve::Ed25519);
        assert_eq!(key.to_multibase(), ED25519_MULTIBASE);
    }

    #[test]
    fn multibase_rejects_other_bases() {
        let err = PublicKey::from_multibase("f00ff").unwrap_err();
        assert!(matches!(err, CryptoError::Encoding(_)));
    }

    #[test]
    fn multibase_rejects_unknown_codec() {
        let encoded = format!("z{}", bs58::encode([0x12, 0x00, 1, 2, 3]).into_string());
        let err = PublicKey::from_multibase(&encoded).unwrap_err();
        assert!(matches!(err, CryptoError::UnsupportedKeyType(_)));
    }

    #[test]
    fn secp256k1_jwk_roundtrip() {
        let jwk = json!({
            "kty": "EC",
            "crv": "secp256k1",
            "x": "_dV63sPUOOojf-RrM-4eAW7aa1hcPifqZmhsLqU1hHk",
            "y": "Rjk_gUUlLupor-Z-KHs-2bMWhbpsOwAGCnO5sSQtaPc",
        });
        let key = PublicKey::from_jwk(&jwk).unwrap();
        assert_eq!(key.curve(), KeyCurve::Secp256k1);
        assert_eq!(key.to_jwk(), jwk);
        assert_eq!(key.to_bytes().len(), 33);

        let again = PublicKey::from_multibase(&key.to_multibase()).unwrap();
        assert_eq!(again, key);
    }

    #[test]
    fn ed25519_jwk_and_raw_encodings_agree() {
        let key = PublicKey::from_multibase(ED25519_MULTIBASE).unwrap();
        let raw = key.to_bytes();

        let from_jwk = PublicKey::from_jwk(&key.to_jwk()).unwrap();
        let from_hex = PublicKey::from_hex(KeyCurve::Ed25519, &hex::encode(&raw)).unwrap();
        let from_b58 =
            PublicKey::from_base58(KeyCurve::Ed25519, &bs58::encode(&raw).into_string()).unwrap();
        assert_eq!(from_jwk, key);
        assert_eq!(from_hex, key);
        assert_eq!(from_b58, key);
    }

    #[test]
    fn jwk_with_unknown_curve_is_unsupported() {
        let jwk = json!({"kty": "EC", "crv": "P-256", "x": "AA", "y": "AA"});
        assert!(matches!(
            PublicKey::from_jwk(&jwk),
            Err(CryptoError::UnsupportedKeyType(_))
        ));
    }

    #[test]
    fn wrong_length_is_key_error() {
        assert!(matches!(
            PublicKey::from_bytes(KeyCurve::Ed25519, &[0u8; 31]),
            Err(CryptoError::KeyError(_))
        ));
        assert!(matches!(
            PublicKey::from_hex(KeyCurve::Secp256k1, "0x0102"),
            Err(CryptoError::KeyError(_))
        ));
    }
}
