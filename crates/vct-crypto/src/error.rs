//! Error types for key handling and JWS processing.

use thiserror::Error;

/// Error while decoding or converting public-key material.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Key bytes are not a valid point or have the wrong length.
    #[error("invalid key: {0}")]
    KeyError(String),

    /// The textual key encoding could not be decoded.
    #[error("invalid key encoding: {0}")]
    Encoding(String),

    /// The key type or curve is not one this crate handles.
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),
}

/// Error while parsing, signing or verifying a compact JWS.
#[derive(Error, Debug)]
pub enum JwsError {
    /// The token does not have the `header.payload.signature` shape.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// A segment is not valid base64url.
    #[error("invalid base64url in {segment}: {source}")]
    SegmentEncoding {
        /// Which segment failed.
        segment: &'static str,
        /// Underlying decode error.
        source: base64::DecodeError,
    },

    /// A segment is not a JSON object.
    #[error("invalid JSON in {segment}: {reason}")]
    SegmentJson {
        /// Which segment failed.
        segment: &'static str,
        /// Why the segment was rejected.
        reason: String,
    },

    /// The `alg` header names an algorithm this crate does not implement.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The key type cannot be used with the token's algorithm.
    #[error("key type {key} cannot verify {alg} signatures")]
    KeyAlgorithmMismatch {
        /// Token algorithm.
        alg: String,
        /// Key curve.
        key: String,
    },

    /// Signature bytes have the wrong length or encoding.
    #[error("malformed signature: {0}")]
    SignatureMalformed(String),

    /// The signature does not verify under the given key.
    #[error("signature does not match")]
    SignatureMismatch,

    /// Key material was rejected.
    #[error(transparent)]
    Key(#[from] CryptoError),
}
