//! # DID Documents
//!
//! A lenient model of the W3C DID document: the fields the verifier needs
//! are typed, everything else is kept verbatim so the document round-trips
//! into the verification report unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vct_crypto::{CryptoError, KeyCurve, PublicKey};

/// W3C DID document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    /// JSON-LD context.
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    /// The DID this document describes.
    pub id: String,
    /// Verification methods declared at the top level.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verification_method: Vec<VerificationMethod>,
    /// Methods usable for authentication.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authentication: Vec<VerificationRelationship>,
    /// Methods usable for issuing assertions such as credentials.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertion_method: Vec<VerificationRelationship>,
    /// Everything else (`controller`, `service`, ...).
    #[serde(flatten)]
    pub property_set: Map<String, Value>,
}

/// Entry of a verification relationship: a reference to a method declared
/// elsewhere, or an embedded method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerificationRelationship {
    /// DID URL of a method in `verificationMethod`.
    Reference(String),
    /// A method defined in place.
    Embedded(VerificationMethod),
}

/// A verification method entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// DID URL identifying this method.
    pub id: String,
    /// Method type, e.g. `Ed25519VerificationKey2020`.
    #[serde(rename = "type")]
    pub type_: String,
    /// Controller DID.
    #[serde(default)]
    pub controller: String,
    /// JWK-encoded key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<Value>,
    /// Multibase-encoded key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,
    /// Base58-encoded raw key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_base58: Option<String>,
    /// Hex-encoded raw key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_hex: Option<String>,
    /// CAIP-10 account id of the controlling key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain_account_id: Option<String>,
    /// Legacy form of `blockchainAccountId`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ethereum_address: Option<String>,
    /// Unrecognised properties.
    #[serde(flatten)]
    pub property_set: Map<String, Value>,
}

/// Key material a verification method contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    /// An explicit public key.
    PublicKey(PublicKey),
    /// Only an account identifier; the key must be recovered from the
    /// signature and its address compared.
    Account(String),
}

impl DidDocument {
    /// An empty document for `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            context: Some(Value::from("https://www.w3.org/ns/did/v1")),
            id: id.into(),
            verification_method: Vec::new(),
            authentication: Vec::new(),
            assertion_method: Vec::new(),
            property_set: Map::new(),
        }
    }

    /// Every method that may have signed a credential: top-level methods
    /// followed by methods embedded in `assertionMethod` and
    /// `authentication`.
    pub fn signing_methods(&self) -> Vec<&VerificationMethod> {
        let embedded = self
            .assertion_method
            .iter()
            .chain(&self.authentication)
            .filter_map(|rel| match rel {
                VerificationRelationship::Embedded(vm) => Some(vm),
                VerificationRelationship::Reference(_) => None,
            });
        let mut methods: Vec<&VerificationMethod> = Vec::new();
        for vm in self.verification_method.iter().chain(embedded) {
            if !methods.iter().any(|m| m.id == vm.id) {
                methods.push(vm);
            }
        }
        methods
    }

    /// Find a signing method by `kid`. Both absolute (`did:...#key-1`) and
    /// relative (`#key-1`) references match.
    pub fn find_method(&self, kid: &str) -> Option<&VerificationMethod> {
        let absolute = self.absolute_id(kid);
        self.signing_methods()
            .into_iter()
            .find(|vm| self.absolute_id(&vm.id) == absolute)
    }

    fn absolute_id(&self, id: &str) -> String {
        if id.starts_with('#') {
            format!("{}{}", self.id, id)
        } else {
            id.to_string()
        }
    }
}

impl VerificationMethod {
    /// Curve implied by the method type, when the type names one.
    pub fn curve_hint(&self) -> Option<KeyCurve> {
        match self.type_.as_str() {
            "Ed25519VerificationKey2018"
            | "Ed25519VerificationKey2020"
            | "Ed25519VerificationKey"
            | "Ed25519SignatureVerification" => Some(KeyCurve::Ed25519),
            "EcdsaSecp256k1VerificationKey2019"
            | "EcdsaSecp256k1RecoveryMethod2020"
            | "Secp256k1VerificationKey2018"
            | "Secp256k1SignatureVerificationKey2018" => Some(KeyCurve::Secp256k1),
            _ => None,
        }
    }

    /// Extract the key material this method publishes.
    ///
    /// Encodings are tried in order: JWK, multibase, base58, hex, then
    /// account identifiers. Raw encodings without a typed curve are
    /// classified by length (32 bytes Ed25519, 33 or 65 bytes secp256k1).
    pub fn key_material(&self) -> Result<KeyMaterial, CryptoError> {
        if let Some(jwk) = &self.public_key_jwk {
            return PublicKey::from_jwk(jwk).map(KeyMaterial::PublicKey);
        }
        if let Some(mb) = &self.public_key_multibase {
            return PublicKey::from_multibase(mb).map(KeyMaterial::PublicKey);
        }
        if let Some(b58) = &self.public_key_base58 {
            let curve = match self.curve_hint() {
                Some(curve) => curve,
                None => curve_from_len(
                    bs58::decode(b58)
                        .into_vec()
                        .map_err(|e| CryptoError::Encoding(e.to_string()))?
                        .len(),
                )?,
            };
            return PublicKey::from_base58(curve, b58).map(KeyMaterial::PublicKey);
        }
        if let Some(hex_key) = &self.public_key_hex {
            let curve = match self.curve_hint() {
                Some(curve) => curve,
                None => curve_from_len(hex_key.trim().trim_start_matches("0x").len() / 2)?,
            };
            return PublicKey::from_hex(curve, hex_key).map(KeyMaterial::PublicKey);
        }
        if let Some(account) = self
            .blockchain_account_id
            .as_ref()
            .or(self.ethereum_address.as_ref())
        {
            return Ok(KeyMaterial::Account(account.clone()));
        }
        Err(CryptoError::UnsupportedKeyType(format!(
            "verification method {} publishes no supported key",
            self.id
        )))
    }
}

fn curve_from_len(len: usize) -> Result<KeyCurve, CryptoError> {
    match len {
        32 => Ok(KeyCurve::Ed25519),
        33 | 65 => Ok(KeyCurve::Secp256k1),
        other => Err(CryptoError::KeyError(format!(
            "cannot infer curve from {other}-byte key"
        ))),
    }
}
