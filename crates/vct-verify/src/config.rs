//! Verifier configuration, injected into the orchestrator at construction.

use std::time::Duration;

use vct_core::KeyOrder;

/// Default tolerance applied to `exp`, `nbf` and `iat`.
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Tunables of one verification pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Key order used when serializing subjects for hashing and diffing.
    pub hash_key_order: KeyOrder,
    /// Clock skew tolerated when checking token time claims.
    pub clock_skew: Duration,
    /// Require a token `aud`, when present, to contain the issuer DID.
    pub check_audience: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            hash_key_order: KeyOrder::Insertion,
            clock_skew: DEFAULT_CLOCK_SKEW,
            check_audience: true,
        }
    }
}
