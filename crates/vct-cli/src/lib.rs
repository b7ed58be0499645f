//! # vct-cli: Command-Line Credential Verifier
//!
//! Provides the `vct` command-line interface over the same pipeline the
//! HTTP service runs.
//!
//! ## Subcommands
//!
//! - `vct verify`: Verify a credential file and print the report.
//! - `vct resolve`: Resolve a DID and print the resolution result.
//!
//! ```bash
//! vct verify credential.json
//! vct verify credential.json --offline --sorted-keys
//! vct resolve did:ethr:sepolia:0xf3beac30c498d9e26865f34fcaa57dbb935b0d74
//! ```
//!
//! Reports go to stdout as pretty JSON; diagnostics go to stderr through
//! `tracing`.

pub mod resolve;
pub mod verify;

use std::sync::Arc;

use anyhow::{Context, Result};
use vct_did::http::DEFAULT_TIMEOUT;
use vct_did::{DidMethodRouter, DidResolver, HttpDidResolver};

/// Build the resolver for a command: `did:key` locally, plus the HTTP
/// resolver for every other method unless `offline`.
pub fn build_resolver(resolver_url: &str, offline: bool) -> Result<Arc<dyn DidResolver>> {
    let router = DidMethodRouter::offline();
    if offline {
        tracing::debug!("offline mode: resolving did:key only");
        return Ok(Arc::new(router));
    }
    let http = HttpDidResolver::new(resolver_url, DEFAULT_TIMEOUT)
        .with_context(|| format!("invalid resolver URL: {resolver_url}"))?;
    Ok(Arc::new(router.with_fallback(Arc::new(http))))
}

/// Single-threaded runtime for one command.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}
