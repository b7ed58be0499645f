//! # Error Types
//!
//! Leaf error types shared by the workspace. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Error during subject serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// The value could not be converted into a JSON tree.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error when constructing a validated identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The string is not a `did:method:identifier` DID.
    #[error("invalid DID: {0:?}")]
    InvalidDid(String),
}
