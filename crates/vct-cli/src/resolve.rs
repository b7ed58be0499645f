//! # Resolve Subcommand
//!
//! Resolves one DID through the same resolver stack `vct verify` uses and
//! prints the W3C resolution result.

use anyhow::{Context, Result};
use clap::Args;

use vct_did::http::DEFAULT_RESOLVER_URL;

/// Arguments for `vct resolve`.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// DID to resolve.
    #[arg(value_name = "DID")]
    pub did: String,

    /// Universal Resolver endpoint for non-local DID methods.
    #[arg(long, default_value = DEFAULT_RESOLVER_URL)]
    pub resolver_url: String,

    /// Resolve `did:key` only; make no network calls.
    #[arg(long)]
    pub offline: bool,
}

/// Execute `vct resolve`.
pub fn run_resolve(args: &ResolveArgs) -> Result<u8> {
    let resolver = crate::build_resolver(&args.resolver_url, args.offline)?;
    let result = crate::runtime()?
        .block_on(resolver.resolve(&args.did))
        .with_context(|| format!("failed to resolve {}", args.did))?;
    let rendered =
        serde_json::to_string_pretty(&result).context("failed to render resolution result")?;
    println!("{rendered}");
    Ok(0)
}
