//! Kubernetes-style health checks.

use axum::routing::get;
use axum::Router;

/// Health check router.
pub fn router<S: Clone + Send + Sync + 'static>() -> Router<S> {
    Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
}

/// Liveness check: 200 while the process runs.
#[utoipa::path(
    get,
    path = "/health/liveness",
    responses((status = 200, description = "Process is alive", body = String)),
    tag = "health"
)]
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness check: 200 once state is built, which precedes serving.
#[utoipa::path(
    get,
    path = "/health/readiness",
    responses((status = 200, description = "Service is ready", body = String)),
    tag = "health"
)]
async fn readiness() -> &'static str {
    "ready"
}
