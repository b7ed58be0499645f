//! # `did:key` Resolver
//!
//! Resolves `did:key` identifiers offline: the document is derived entirely
//! from the multicodec key embedded in the identifier. Supported codecs are
//! Ed25519 (`0xed01`) and secp256k1 (`0xe701`).

use async_trait::async_trait;
use serde_json::{json, Value};
use vct_core::Did;
use vct_crypto::PublicKey;

use crate::document::{DidDocument, VerificationMethod, VerificationRelationship};
use crate::resolver::{DidResolver, ResolutionError, ResolutionResult};

/// The `did:key` identifier of a public key.
pub fn did_key_for(key: &PublicKey) -> String {
    format!("did:key:{}", key.to_multibase())
}

/// Offline resolver for the `did:key` method.
#[derive(Debug, Clone, Copy, Default)]
pub struct DidKeyResolver;

impl DidKeyResolver {
    /// Create the resolver.
    pub fn new() -> Self {
        Self
    }

    /// Derive the DID document for a `did:key` identifier.
    pub fn document_for(&self, did: &Did) -> Result<DidDocument, ResolutionError> {
        if did.method() != "key" {
            return Err(ResolutionError::MethodNotSupported(did.to_string()));
        }
        let multibase = did.method_specific_id();
        let key = PublicKey::from_multibase(multibase)
            .map_err(|_| ResolutionError::InvalidDid(did.to_string()))?;

        let vm_id = format!("{did}#{multibase}");
        let (type_, public_key_jwk, public_key_multibase) = match &key {
            PublicKey::Ed25519(_) => (
                "Ed25519VerificationKey2020",
                None,
                Some(multibase.to_string()),
            ),
            PublicKey::Secp256k1(_) => (
                "EcdsaSecp256k1VerificationKey2019",
                Some(key.to_jwk()),
                None,
            ),
        };

        let mut doc = DidDocument::new(did.as_str());
        doc.context = Some(json!([
            "https://www.w3.org/ns/did/v1",
            "https://w3id.org/security/suites/ed25519-2020/v1",
            "https://w3id.org/security/suites/secp256k1-2019/v1",
        ]));
        doc.verification_method.push(VerificationMethod {
            id: vm_id.clone(),
            type_: type_.to_string(),
            controller: did.to_string(),
            public_key_jwk,
            public_key_multibase,
            public_key_base58: None,
            public_key_hex: None,
            blockchain_account_id: None,
            ethereum_address: None,
            property_set: Default::default(),
        });
        doc.authentication
            .push(VerificationRelationship::Reference(vm_id.clone()));
        doc.assertion_method
            .push(VerificationRelationship::Reference(vm_id.clone()));
        doc.property_set.insert(
            "capabilityInvocation".to_string(),
            Value::Array(vec![Value::from(vm_id.clone())]),
        );
        doc.property_set.insert(
            "capabilityDelegation".to_string(),
            Value::Array(vec![Value::from(vm_id)]),
        );
        Ok(doc)
    }
}

#[async_trait]
impl DidResolver for DidKeyResolver {
    async fn resolve(&self, did: &str) -> Result<ResolutionResult, ResolutionError> {
        let did = Did::new(did).map_err(|_| ResolutionError::InvalidDid(did.to_string()))?;
        let document = self.document_for(&did)?;
        tracing::debug!(%did, "derived did:key document");
        Ok(ResolutionResult::from_document(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::KeyMaterial;
    use vct_crypto::SigningKey;

    const DID: &str = "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK";

    #[tokio::test]
    async fn resolves_ed25519_did_key() {
        let result = DidKeyResolver::new().resolve(DID).await.unwrap();
        let doc = &result.did_document;
        assert_eq!(doc.id, DID);
        assert_eq!(doc.verification_method.len(), 1);
        let vm = &doc.verification_method[0];
        assert_eq!(vm.type_, "Ed25519VerificationKey2020");
        assert_eq!(vm.id, format!("{DID}#z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK"));
        assert!(matches!(vm.key_material().unwrap(), KeyMaterial::PublicKey(_)));
    }

    #[tokio::test]
    async fn resolves_secp256k1_did_key_with_jwk() {
        let key = SigningKey::generate_secp256k1().public_key();
        let did = did_key_for(&key);
        assert!(did.starts_with("did:key:zQ3s"));

        let result = DidKeyResolver::new().resolve(&did).await.unwrap();
        let vm = &result.did_document.verification_method[0];
        assert_eq!(vm.type_, "EcdsaSecp256k1VerificationKey2019");
        assert_eq!(vm.key_material().unwrap(), KeyMaterial::PublicKey(key));
    }

    #[tokio::test]
    async fn rejects_other_methods_and_garbage() {
        let resolver = DidKeyResolver::new();
        assert!(matches!(
            resolver.resolve("did:web:example.com").await,
            Err(ResolutionError::MethodNotSupported(_))
        ));
        assert!(matches!(
            resolver.resolve("did:key:zNotAKey").await,
            Err(ResolutionError::InvalidDid(_))
        ));
        assert!(matches!(
            resolver.resolve("not a did").await,
            Err(ResolutionError::InvalidDid(_))
        ));
    }
}
