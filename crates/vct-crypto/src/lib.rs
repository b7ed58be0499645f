//! # vct-crypto: Cryptographic Primitives
//!
//! Provides the signature machinery behind credential proofs:
//!
//! - **Public keys** for Ed25519 and secp256k1, parsed from the encodings
//!   DID documents carry (JWK, multibase, base58, hex).
//! - **Compact JWS** splitting, segment decoding, signing and verification
//!   for `EdDSA`, `ES256K` and `ES256K-R`.
//! - **Ethereum addresses** derived from secp256k1 keys, for verification
//!   methods that only publish a `blockchainAccountId`.
//!
//! ## Crate Policy
//!
//! - No internal dependencies.
//! - No mocking of cryptographic operations in tests. All tests use real
//!   Ed25519 and secp256k1 keys.
//! - No `unsafe` code.

pub mod error;
pub mod ethereum;
pub mod jws;
pub mod keys;

pub use error::{CryptoError, JwsError};
pub use jws::{Algorithm, CompactJws, SigningKey};
pub use keys::{KeyCurve, PublicKey};
