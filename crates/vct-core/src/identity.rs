//! # Decentralized Identifiers
//!
//! [`Did`] is the validated newtype for W3C DIDs. Construction checks the
//! `did:<method>:<method-specific-id>` shape; resolvers rely on the method
//! segment for routing.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A W3C Decentralized Identifier.
///
/// # Validation
///
/// - Must start with `did:`.
/// - The method segment must be non-empty lowercase ASCII alphanumerics.
/// - The method-specific identifier must be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Create a DID from a string value, validating its format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDid`] if the string does not
    /// match the `did:method:identifier` format.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    fn validate(s: &str) -> Result<(), ValidationError> {
        let invalid = || ValidationError::InvalidDid(s.to_string());
        let rest = s.strip_prefix("did:").ok_or_else(invalid)?;
        let (method, identifier) = rest.split_once(':').ok_or_else(invalid)?;

        if method.is_empty()
            || !method
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(invalid());
        }
        if identifier.is_empty() {
            return Err(invalid());
        }
        Ok(())
    }

    /// Access the DID string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The DID method (the part between the first and second colons).
    pub fn method(&self) -> &str {
        self.parts().0
    }

    /// The method-specific identifier (everything after `did:method:`).
    pub fn method_specific_id(&self) -> &str {
        self.parts().1
    }

    fn parts(&self) -> (&str, &str) {
        self.0
            .strip_prefix("did:")
            .and_then(|rest| rest.split_once(':'))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Did {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Did {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn did_valid_examples() {
        for s in [
            "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK",
            "did:web:example.com",
            "did:ethr:0xb9c5714089478a327f09197987f16f9e5d936e8a",
            "did:ion:EiClkZMDxPKqC9c-umQfTkR8vvZ9JPhl_xLDI9Nfk38w5w:extra",
        ] {
            assert!(Did::new(s).is_ok(), "{s} should be valid");
        }
    }

    #[test]
    fn did_method_extraction() {
        let did = Did::new("did:web:example.com:users:alice").unwrap();
        assert_eq!(did.method(), "web");
        assert_eq!(did.method_specific_id(), "example.com:users:alice");
    }

    #[test]
    fn did_rejects_invalid() {
        for s in ["", "did:", "did:web", "did::abc", "did:Web:x", "did:web:", "urn:web:x"] {
            assert_eq!(
                Did::new(s),
                Err(ValidationError::InvalidDid(s.to_string())),
                "{s:?} should be rejected"
            );
        }
    }

    #[test]
    fn did_serde_roundtrip_validates() {
        let did: Did = serde_json::from_str(r#""did:key:z6Mk""#).unwrap();
        assert_eq!(did.as_str(), "did:key:z6Mk");
        assert!(serde_json::from_str::<Did>(r#""not-a-did""#).is_err());
        assert_eq!(serde_json::to_string(&did).unwrap(), r#""did:key:z6Mk""#);
    }
}
