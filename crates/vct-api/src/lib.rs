//! # vct-api: Credential Verification Service
//!
//! Axum HTTP front end of the verification pipeline in `vct-verify`.
//!
//! ## API Surface
//!
//! | Route                    | Module               | Purpose                        |
//! |--------------------------|----------------------|--------------------------------|
//! | `POST /verify`           | [`routes::verify`]   | Verify an uploaded credential  |
//! | `GET /health/liveness`   | [`routes::health`]   | Liveness check                 |
//! | `GET /health/readiness`  | [`routes::health`]   | Readiness check                |
//! | `GET /metrics`           | this module          | Prometheus scrape endpoint     |
//! | `GET /openapi.json`      | [`openapi`]          | Generated OpenAPI spec         |
//!
//! `/metrics` and the metrics middleware are mounted only when
//! [`AppConfig::metrics_enabled`] is set (`VCT_METRICS_ENABLED`, default on).
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → CatchPanicLayer → MetricsMiddleware → DefaultBodyLimit → Handler
//! ```
//!
//! ## Crate Policy
//!
//! - No verification logic in handlers; they delegate to the orchestrator.
//! - All errors map to structured HTTP responses via [`AppError`].

pub mod config;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, StatusCode};
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::Router;

pub use config::AppConfig;
pub use error::AppError;
pub use state::AppState;

/// Assemble the application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let limit = state.config.max_upload_bytes;
    let metrics_on = state.config.metrics_enabled;
    let metrics = state.metrics.clone();

    let api = routes::verify::router().layer(DefaultBodyLimit::max(limit));

    let mut router = Router::new()
        .merge(routes::health::router())
        .merge(openapi::router())
        .merge(api);

    if metrics_on {
        router = router
            .route("/metrics", axum::routing::get(prometheus_metrics))
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(axum::Extension(metrics));
    }

    router
        .with_state(state)
        .layer(middleware::panic::layer())
        .layer(middleware::tracing_layer::layer())
}

/// GET /metrics: Prometheus scrape endpoint.
#[utoipa::path(
    get,
    path = "/metrics",
    responses(
        (status = 200, description = "Metrics in Prometheus text format", body = String),
        (status = 500, description = "Metrics could not be encoded"),
    ),
    tag = "metrics"
)]
async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    match state.metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, middleware::metrics::CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}
