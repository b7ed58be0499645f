//! # vct-did: DID Resolution
//!
//! The "resolve DID to public key material" capability consumed by the
//! verification pipeline, plus the resolvers that implement it.
//!
//! | Resolver             | Source of documents                           |
//! |----------------------|-----------------------------------------------|
//! | [`DidKeyResolver`]   | Derived offline from the `did:key` identifier |
//! | [`HttpDidResolver`]  | A Universal Resolver HTTP endpoint            |
//! | [`StaticDidResolver`]| An in-memory map                              |
//! | [`DidMethodRouter`]  | Delegates by DID method                       |
//!
//! Resolvers hold no per-request state. Concurrent resolutions never
//! influence each other.

pub mod document;
pub mod http;
pub mod key;
pub mod resolver;
pub mod router;
pub mod static_resolver;

pub use document::{DidDocument, KeyMaterial, VerificationMethod, VerificationRelationship};
pub use http::HttpDidResolver;
pub use key::{did_key_for, DidKeyResolver};
pub use resolver::{
    DidResolver, DocumentMetadata, ResolutionError, ResolutionMetadata, ResolutionResult,
};
pub use router::DidMethodRouter;
pub use static_resolver::StaticDidResolver;
