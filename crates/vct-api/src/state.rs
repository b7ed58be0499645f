//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Built once at start-up; holds no per-request
//! data, so concurrent verifications never influence each other.

use std::sync::Arc;

use vct_did::{DidMethodRouter, DidResolver, HttpDidResolver, ResolutionError};
use vct_schema::{SchemaLoadError, StructuralValidator};
use vct_verify::VerificationOrchestrator;

use crate::config::AppConfig;
use crate::middleware::metrics::ApiMetrics;

/// Start-up failures.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The credential schema could not be loaded.
    #[error("schema: {0}")]
    Schema(#[from] SchemaLoadError),

    /// The HTTP resolver could not be constructed.
    #[error("resolver: {0}")]
    Resolver(#[from] ResolutionError),

    /// The metrics registry could not be built.
    #[error("metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Arc<AppConfig>,
    /// The verification pipeline.
    pub orchestrator: Arc<VerificationOrchestrator>,
    /// Request and verification-outcome metrics.
    pub metrics: ApiMetrics,
}

impl AppState {
    /// Build the production state: `did:key` resolved locally, every other
    /// method through the configured Universal Resolver.
    pub fn new(config: AppConfig) -> Result<Self, BootstrapError> {
        let http = HttpDidResolver::new(config.resolver_url.as_str(), config.resolver_timeout)?;
        let resolver = DidMethodRouter::offline().with_fallback(Arc::new(http));
        Self::with_resolver(config, Arc::new(resolver))
    }

    /// Build state around an explicit resolver.
    pub fn with_resolver(
        config: AppConfig,
        resolver: Arc<dyn DidResolver>,
    ) -> Result<Self, BootstrapError> {
        let validator = match &config.schema_path {
            Some(path) => StructuralValidator::from_path(path)?,
            None => StructuralValidator::new()?,
        };
        tracing::info!(schema = validator.source(), "credential schema loaded");
        let orchestrator = VerificationOrchestrator::with_default_verifier(
            config.verifier,
            Arc::new(validator),
            resolver,
        );
        Self::with_orchestrator(config, orchestrator)
    }

    /// Wrap an already assembled orchestrator.
    pub fn with_orchestrator(
        config: AppConfig,
        orchestrator: VerificationOrchestrator,
    ) -> Result<Self, BootstrapError> {
        Ok(Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            metrics: ApiMetrics::new()?,
        })
    }
}
