//! # Content Digest
//!
//! SHA-256 digests over [`CanonicalBytes`]. The function signature of
//! [`sha256_digest()`] is what guarantees every credential hash in the
//! workspace went through the serialization pipeline.

use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// A 32-byte SHA-256 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Compute the SHA-256 digest of serialized bytes.
pub fn sha256_digest(bytes: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(bytes.as_bytes());
    ContentDigest(hash.into())
}

/// Compute the SHA-256 digest and return it as lowercase hex.
pub fn sha256_hex(bytes: &CanonicalBytes) -> String {
    sha256_digest(bytes).to_hex()
}
