//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into one OpenAPI spec, served at
//! `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "VCT API: Verifiable Credential Tamper Verification",
        version = "0.1.0",
        description = "Verifies W3C Verifiable Credentials carrying a JWT proof: structure, issuer DID resolution, signature and subject hash.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::verify::verify,
        crate::routes::health::liveness,
        crate::routes::health::readiness,
        crate::prometheus_metrics,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::routes::verify::VerifyUpload,
        crate::routes::verify::VerificationReportSchema,
    )),
    tags(
        (name = "verify", description = "Credential verification"),
        (name = "health", description = "Kubernetes-style health checks"),
        (name = "metrics", description = "Prometheus scrape endpoint"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router<S: Clone + Send + Sync + 'static>() -> Router<S> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
