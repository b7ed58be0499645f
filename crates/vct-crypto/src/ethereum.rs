//! Ethereum address derivation for secp256k1 keys.
//!
//! `did:ethr` documents frequently publish only a `blockchainAccountId`
//! (the controller address) instead of a public key. Such methods are
//! matched by recovering the signer key from an ES256K / ES256K-R signature
//! and comparing its address.

use k256::elliptic_curve::sec1::ToEncodedPoint;
use keccak_hash::keccak;

/// Lowercase `0x`-prefixed address: last 20 bytes of the Keccak-256 hash of
/// the uncompressed point (without the `0x04` tag).
pub fn address_from_key(key: &k256::ecdsa::VerifyingKey) -> String {
    let point = k256::PublicKey::from(key).to_encoded_point(false);
    let hash = keccak(&point.as_bytes()[1..]).to_fixed_bytes();
    format!("0x{}", hex::encode(&hash[12..]))
}

/// Extract the address from a `blockchainAccountId`.
///
/// Accepts CAIP-10 (`eip155:1:0xabc...`) and the legacy
/// `0xabc...@eip155:1` form. Anything else is returned trimmed.
pub fn address_from_account_id(account_id: &str) -> &str {
    let account_id = account_id.trim();
    if let Some((address, _chain)) = account_id.split_once('@') {
        return address;
    }
    account_id.rsplit(':').next().unwrap_or(account_id)
}

/// Case-insensitive comparison of an account id against a derived address.
pub fn account_matches(account_id: &str, address: &str) -> bool {
    address_from_account_id(account_id).eq_ignore_ascii_case(address)
}
