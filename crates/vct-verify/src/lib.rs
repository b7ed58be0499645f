//! # vct-verify: Credential Tamper Verification
//!
//! Verifies an uploaded Verifiable Credential and explains any tampering:
//!
//! ```text
//! upload ─► structure ─► issuer DID ─► resolution ─► proof ─► hash ─► diff
//!             │             │fatal          │             │        │
//!             ▼             ▼               ▼             ▼        ▼
//!                       VerificationReport (one field per stage)
//! ```
//!
//! The [`VerificationOrchestrator`] owns the sequence. Its collaborators are
//! the structural validator from `vct-schema`, a [`vct_did::DidResolver`],
//! and a [`SignatureVerifier`]; all three are injected so deployments and
//! tests can swap them.
//!
//! ## Failure Policy
//!
//! Only an unparseable upload and a missing or non-DID issuer abort the
//! pipeline ([`VerifyError`]). Resolution failures, signature failures and
//! undecodable tokens become report fields so every processable upload
//! yields a complete report.
//!
//! ## Crate Policy
//!
//! - No `unwrap()` or `expect()` outside tests.
//! - All diagnostics go through `tracing`.

#![deny(missing_docs)]

pub mod config;
pub mod credential;
pub mod diff;
pub mod error;
pub mod hash;
pub mod orchestrator;
pub mod proof;
pub mod report;

pub use config::{VerifierConfig, DEFAULT_CLOCK_SKEW};
pub use diff::{diff, FieldChange, TamperDiff};
pub use error::{SignatureError, VerifyError};
pub use hash::{check_subject_hash, subject_hash, HashCheck};
pub use orchestrator::VerificationOrchestrator;
pub use proof::{JwtVerifier, ProofOutcome, ProofVerifier, SignatureVerifier, VerifiedJwt};
pub use report::{DidResolution, VerificationReport};
