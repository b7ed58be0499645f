//! # vct-core: Foundational Types for the Credential Verifier
//!
//! Leaf crate of the workspace. Every other `vct-*` crate depends on it and
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** All hash computation flows through
//!    `CanonicalBytes::new()`. No raw `serde_json::to_vec()` for digests.
//!    The key ordering used for the byte layout is an explicit [`KeyOrder`]
//!    argument, never an ambient default.
//!
//! 2. **`sha256_digest()` accepts only `&CanonicalBytes`.** A digest can only
//!    be produced from bytes that went through the serialization pipeline.
//!
//! 3. **Validated identifiers.** [`Did`] is a newtype with a checked
//!    constructor. No bare strings for issuer identities.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vct-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

#![deny(missing_docs)]

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;

pub use canonical::{CanonicalBytes, KeyOrder};
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::Did;
