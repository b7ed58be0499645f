//! # Subject Hash Check
//!
//! The issuer embeds `credentialHash = sha256_hex(serialize(subject))` in
//! the signed payload. Verification recomputes the hash over the uploaded
//! subject with the same serialization and compares. An absent uploaded
//! subject hashes as JSON `null`; an absent or non-string embedded hash
//! never matches.

use serde::Serialize;
use serde_json::Value;
use vct_core::{sha256_hex, CanonicalBytes, CanonicalizationError, KeyOrder};

use crate::credential::embedded_hash;

/// Hex SHA-256 of a subject serialized under `order`.
pub fn subject_hash(subject: Option<&Value>, order: KeyOrder) -> Result<String, CanonicalizationError> {
    let bytes = CanonicalBytes::new(&subject.unwrap_or(&Value::Null), order)?;
    Ok(sha256_hex(&bytes))
}

/// Outcome of comparing an embedded hash with a recomputed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HashCheck {
    /// `credentialHash` claim from the payload.
    pub embedded_hash: Option<String>,
    /// Hash recomputed from the uploaded subject.
    pub calculated_hash: String,
    /// Whether both hashes are present and equal.
    pub matches: bool,
}

/// Compare the payload's `credentialHash` with the uploaded subject's hash.
pub fn check_subject_hash(
    payload: &Value,
    uploaded_subject: Option<&Value>,
    order: KeyOrder,
) -> Result<HashCheck, CanonicalizationError> {
    let calculated_hash = subject_hash(uploaded_subject, order)?;
    let embedded_hash = embedded_hash(payload).map(str::to_string);
    let matches = embedded_hash.as_deref() == Some(calculated_hash.as_str());
    Ok(HashCheck {
        embedded_hash,
        calculated_hash,
        matches,
    })
}
