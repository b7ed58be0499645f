//! In-memory resolver for pinned DIDs and tests.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::document::DidDocument;
use crate::resolver::{DidResolver, ResolutionError, ResolutionResult};

/// Resolves DIDs from a fixed set of documents, keyed by document `id`.
#[derive(Debug, Clone, Default)]
pub struct StaticDidResolver {
    documents: HashMap<String, DidDocument>,
}

impl StaticDidResolver {
    /// An empty resolver. Every lookup fails with `NotFound`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document, replacing any previous document with the same id.
    pub fn insert(&mut self, document: DidDocument) {
        self.documents.insert(document.id.clone(), document);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_document(mut self, document: DidDocument) -> Self {
        self.insert(document);
        self
    }

    /// Number of pinned documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no documents are pinned.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DidResolver for StaticDidResolver {
    async fn resolve(&self, did: &str) -> Result<ResolutionResult, ResolutionError> {
        self.documents
            .get(did)
            .cloned()
            .map(ResolutionResult::from_document)
            .ok_or_else(|| ResolutionError::NotFound(did.to_string()))
    }
}
