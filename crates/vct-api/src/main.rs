//! # vct-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for credential verification.

use anyhow::Context;
use vct_api::{AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("loading configuration")?;
    let addr = config.listen_addr();
    tracing::info!(
        resolver = %config.resolver_url,
        key_order = %config.verifier.hash_key_order,
        max_upload_bytes = config.max_upload_bytes,
        metrics = config.metrics_enabled,
        "configuration loaded"
    );

    let state = AppState::new(config).context("building application state")?;
    let app = vct_api::app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "VC verifier listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// `RUST_LOG` filter (default `info`); JSON lines when `VCT_LOG_FORMAT=json`.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if std::env::var("VCT_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}
