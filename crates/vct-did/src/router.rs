//! Dispatch resolution by DID method.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use vct_core::Did;

use crate::resolver::{DidResolver, ResolutionError, ResolutionResult};

/// Routes each DID to the resolver registered for its method, falling back
/// to an optional catch-all resolver.
#[derive(Clone, Default)]
pub struct DidMethodRouter {
    methods: HashMap<String, Arc<dyn DidResolver>>,
    fallback: Option<Arc<dyn DidResolver>>,
}

impl DidMethodRouter {
    /// A router with no methods and no fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// A router resolving `did:key` locally and nothing else.
    pub fn offline() -> Self {
        Self::new().with_method("key", Arc::new(crate::key::DidKeyResolver::new()))
    }

    /// Register `resolver` for `method` (e.g. `"key"`).
    pub fn with_method(mut self, method: impl Into<String>, resolver: Arc<dyn DidResolver>) -> Self {
        self.methods.insert(method.into(), resolver);
        self
    }

    /// Resolver used for methods without a dedicated entry.
    pub fn with_fallback(mut self, resolver: Arc<dyn DidResolver>) -> Self {
        self.fallback = Some(resolver);
        self
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for DidMethodRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DidMethodRouter")
            .field("methods", &self.methods())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

#[async_trait]
impl DidResolver for DidMethodRouter {
    async fn resolve(&self, did: &str) -> Result<ResolutionResult, ResolutionError> {
        let parsed = Did::new(did).map_err(|_| ResolutionError::InvalidDid(did.to_string()))?;
        let resolver = self
            .methods
            .get(parsed.method())
            .or(self.fallback.as_ref())
            .ok_or_else(|| ResolutionError::MethodNotSupported(did.to_string()))?;
        resolver.resolve(did).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DidDocument;
    use crate::key::DidKeyResolver;
    use crate::static_resolver::StaticDidResolver;

    const KEY_DID: &str = "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK";

    #[tokio::test]
    async fn routes_by_method() {
        let router = DidMethodRouter::new().with_method("key", Arc::new(DidKeyResolver::new()));
        assert_eq!(router.methods(), vec!["key"]);
        assert!(router.resolve(KEY_DID).await.is_ok());
        assert_eq!(
            router.resolve("did:web:example.com").await.unwrap_err(),
            ResolutionError::MethodNotSupported("did:web:example.com".to_string())
        );
    }

    #[tokio::test]
    async fn falls_back_for_unregistered_methods() {
        let pinned = StaticDidResolver::new().with_document(DidDocument::new("did:web:example.com"));
        let router = DidMethodRouter::new()
            .with_method("key", Arc::new(DidKeyResolver::new()))
            .with_fallback(Arc::new(pinned));
        let result = router.resolve("did:web:example.com").await.unwrap();
        assert_eq!(result.did_document.id, "did:web:example.com");
    }

    #[tokio::test]
    async fn offline_router_handles_did_key_only() {
        let router = DidMethodRouter::offline();
        assert_eq!(router.methods(), vec!["key"]);
        assert!(router.resolve(KEY_DID).await.is_ok());
        assert!(matches!(
            router.resolve("did:ethr:sepolia:0xf3beac30c498d9e26865f34fcaa57dbb935b0d74").await,
            Err(ResolutionError::MethodNotSupported(_))
        ));
    }

    #[tokio::test]
    async fn invalid_did_is_rejected_before_routing() {
        let router = DidMethodRouter::new().with_fallback(Arc::new(StaticDidResolver::new()));
        assert!(matches!(
            router.resolve("did:").await,
            Err(ResolutionError::InvalidDid(_))
        ));
    }
}
