//! # Verify Subcommand
//!
//! Runs the verification pipeline over a credential file and prints the
//! report. Fatal pipeline errors (unparseable file, missing issuer) exit
//! non-zero; every other outcome is a report.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;

use vct_core::KeyOrder;
use vct_did::http::DEFAULT_RESOLVER_URL;
use vct_did::DidResolver;
use vct_schema::StructuralValidator;
use vct_verify::{VerificationOrchestrator, VerificationReport, VerifierConfig};

/// Arguments for `vct verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to the credential JSON file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Universal Resolver endpoint for non-local DID methods.
    #[arg(long, default_value = DEFAULT_RESOLVER_URL)]
    pub resolver_url: String,

    /// Resolve `did:key` only; make no network calls.
    #[arg(long)]
    pub offline: bool,

    /// Hash and diff subjects with sorted keys (JCS) instead of document order.
    #[arg(long)]
    pub sorted_keys: bool,

    /// Credential schema overriding the built-in one.
    #[arg(long)]
    pub schema: Option<PathBuf>,
}

/// Execute `vct verify`.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let resolver = crate::build_resolver(&args.resolver_url, args.offline)?;
    let report = crate::runtime()?.block_on(verify_file(args, resolver))?;
    let rendered = serde_json::to_string_pretty(&report).context("failed to render report")?;
    println!("{rendered}");
    Ok(0)
}

/// Verify the credential at `args.file` against `resolver`.
pub async fn verify_file(
    args: &VerifyArgs,
    resolver: Arc<dyn DidResolver>,
) -> Result<VerificationReport> {
    let bytes = read_credential(&args.file)?;
    let validator = match &args.schema {
        Some(path) => StructuralValidator::from_path(path)?,
        None => StructuralValidator::new()?,
    };
    let config = VerifierConfig {
        hash_key_order: if args.sorted_keys {
            KeyOrder::Sorted
        } else {
            KeyOrder::Insertion
        },
        ..VerifierConfig::default()
    };
    let orchestrator =
        VerificationOrchestrator::with_default_verifier(config, Arc::new(validator), resolver);

    match orchestrator.verify_bytes(&bytes).await {
        Ok(report) => {
            tracing::info!(
                jwt_verified = report.jwt_verified,
                hash_check = ?report.credential_hash_check,
                "verification complete"
            );
            Ok(report)
        }
        Err(err) => match err.details() {
            Some(details) => bail!("{err}: {details}"),
            None => bail!("{err}"),
        },
    }
}

fn read_credential(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        bail!("credential file not found: {}", path.display());
    }
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}
