//! # Integration Tests for vct-api
//!
//! Drives the assembled router with `tower::ServiceExt::oneshot`: health
//! checks, multipart verification of minted credentials, the structured
//! error responses for every fatal failure class, and the metrics and
//! OpenAPI routes.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use vct_api::state::AppState;
use vct_api::AppConfig;
use vct_core::KeyOrder;
use vct_crypto::{Algorithm, SigningKey};
use vct_did::{did_key_for, DidMethodRouter};

const BOUNDARY: &str = "vct-test-boundary";

/// Helper: build the app with an offline resolver.
fn test_app_with(config: AppConfig) -> axum::Router {
    let state = AppState::with_resolver(config, Arc::new(DidMethodRouter::offline())).unwrap();
    vct_api::app(state)
}

fn test_app() -> axum::Router {
    test_app_with(AppConfig::defaults().unwrap())
}

/// Helper: a `multipart/form-data` POST with one file part.
fn upload(field: &str, content: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"vc.json\"\r\nContent-Type: application/json\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/verify")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Helper: read response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Helper: a signed credential whose proof embeds the subject hash.
fn minted_credential() -> Value {
    let key = SigningKey::generate_ed25519();
    let did = did_key_for(&key.public_key());
    let subject = json!({
        "id": "did:example:holder",
        "name": "Alice Example",
        "role": "Engineer"
    });
    let hash = vct_verify::subject_hash(Some(&subject), KeyOrder::Insertion).unwrap();
    let jwt = key
        .sign_jws(
            Algorithm::EdDSA,
            &json!({
                "iss": did,
                "credentialHash": hash,
                "vc": { "credentialSubject": subject }
            }),
            None,
        )
        .unwrap();
    json!({
        "@context": ["https://www.w3.org/2018/credentials/v1"],
        "type": ["VerifiableCredential"],
        "issuer": did,
        "issuanceDate": "2024-01-15T09:30:00Z",
        "credentialSubject": subject,
        "proof": { "type": "JwtProof2020", "jwt": jwt }
    })
}

// -- Health Checks ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_check() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/health/liveness")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_check() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/health/readiness")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

// -- Verification -------------------------------------------------------------

#[tokio::test]
async fn test_verify_untampered_credential() {
    let vc = minted_credential();
    let response = test_app()
        .oneshot(upload("vc", vc.to_string().as_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report = body_json(response).await;
    assert_eq!(report["validStructure"], true);
    assert_eq!(report["jwtVerified"], true);
    assert_eq!(report["credentialHashCheck"], true);
    assert_eq!(report["embeddedHash"], report["calculatedHash"]);
    assert_eq!(report["didResolution"]["didDocument"]["id"], vc["issuer"]);
    assert!(report.get("tamperDiff").is_none());
    assert!(report.get("jwtError").is_none());
}

#[tokio::test]
async fn test_verify_tampered_credential_reports_diff() {
    let mut vc = minted_credential();
    vc["credentialSubject"]["role"] = json!("Administrator");

    let response = test_app()
        .oneshot(upload("vc", vc.to_string().as_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report = body_json(response).await;
    assert_eq!(report["credentialHashCheck"], false);
    assert_eq!(
        report["tamperDiff"]["changed"]["role"],
        json!({"from": "Engineer", "to": "Administrator"})
    );
    assert_eq!(report["tamperDiff"]["added"], json!({}));
    assert_eq!(report["tamperDiff"]["removed"], json!({}));
}

#[tokio::test]
async fn test_verify_without_proof() {
    let mut vc = minted_credential();
    vc.as_object_mut().unwrap().remove("proof");

    let response = test_app()
        .oneshot(upload("vc", vc.to_string().as_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report = body_json(response).await;
    assert_eq!(report["jwtVerified"], false);
    assert_eq!(report["jwtError"], "No JWT proof provided.");
    assert!(report["credentialHashCheck"].is_null());
}

#[tokio::test]
async fn test_unresolvable_issuer_is_reported_not_fatal() {
    let mut vc = minted_credential();
    vc["issuer"] = json!({"id": "did:web:issuer.example", "name": "Example University"});

    let response = test_app()
        .oneshot(upload("vc", vc.to_string().as_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report = body_json(response).await;
    assert_eq!(report["didResolution"]["error"], "Failed to resolve DID");
    assert_eq!(report["jwtVerified"], false);
}

// -- Error Responses ----------------------------------------------------------

#[tokio::test]
async fn test_missing_file_field() {
    let response = test_app()
        .oneshot(upload("document", b"{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({"valid": false, "error": "No file uploaded", "code": "MISSING_FILE"})
    );
}

#[tokio::test]
async fn test_non_multipart_request() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/verify")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "MISSING_FILE");
}

#[tokio::test]
async fn test_invalid_json_upload() {
    let response = test_app()
        .oneshot(upload("vc", b"{\"issuer\": "))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["error"], "Invalid JSON format");
    assert_eq!(body["code"], "MALFORMED_INPUT");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_issuer_must_be_did() {
    let mut vc = minted_credential();
    vc["issuer"] = json!("Example University");

    let response = test_app()
        .oneshot(upload("vc", vc.to_string().as_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Issuer must be a valid DID");
    assert_eq!(body["code"], "MISSING_ISSUER");
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let mut config = AppConfig::defaults().unwrap();
    config.max_upload_bytes = 256;
    let padding = "x".repeat(4096);
    let vc = json!({"issuer": "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK", "padding": padding});

    let response = test_app_with(config)
        .oneshot(upload("vc", vc.to_string().as_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/v1/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Metrics and OpenAPI ------------------------------------------------------

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Whether `text` holds a sample of `metric` carrying every label and `value`.
fn has_sample(text: &str, metric: &str, labels: &[&str], value: &str) -> bool {
    text.lines().any(|line| {
        line.starts_with(&format!("{metric}{{"))
            && labels.iter().all(|label| line.contains(label))
            && line.ends_with(&format!(" {value}"))
    })
}

#[tokio::test]
async fn test_metrics_count_requests_and_verification_outcomes() {
    let app = test_app();

    let vc = minted_credential();
    let mut tampered = vc.clone();
    tampered["credentialSubject"]["role"] = json!("Administrator");
    let mut unsigned = vc.clone();
    unsigned.as_object_mut().unwrap().remove("proof");

    for credential in [&vc, &tampered, &unsigned] {
        let response = app
            .clone()
            .oneshot(upload("vc", credential.to_string().as_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app
        .clone()
        .oneshot(upload("vc", b"{ not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    let text = body_string(response).await;

    let outcome = |verified: &str, hash: &str| {
        let labels = [
            format!("jwt_verified=\"{verified}\""),
            format!("credential_hash_check=\"{hash}\""),
        ];
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        has_sample(&text, "vct_verifications_total", &labels, "1")
    };
    assert!(outcome("true", "true"), "{text}");
    assert!(outcome("true", "false"), "{text}");
    assert!(outcome("false", "none"), "{text}");

    let verify_ok = [r#"path="/verify""#, r#"status="200""#];
    let verify_bad = [r#"path="/verify""#, r#"status="400""#];
    assert!(has_sample(&text, "vct_http_requests_total", &verify_ok, "3"), "{text}");
    assert!(has_sample(&text, "vct_http_errors_total", &verify_bad, "1"), "{text}");
}

#[tokio::test]
async fn test_metrics_route_absent_when_disabled() {
    let mut config = AppConfig::defaults().unwrap();
    config.metrics_enabled = false;
    let response = test_app_with(config).oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_documents_verify_and_health() {
    let response = test_app().oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let spec = body_json(response).await;
    let verify = &spec["paths"]["/verify"]["post"];
    assert!(verify.is_object(), "{spec}");
    assert!(verify["requestBody"]["content"]["multipart/form-data"].is_object());
    assert!(verify["responses"]["200"].is_object());
    assert!(verify["responses"]["400"].is_object());
    assert!(spec["paths"]["/health/liveness"]["get"].is_object());
    assert!(spec["paths"]["/health/readiness"]["get"].is_object());
    assert!(spec["components"]["schemas"]["ErrorBody"].is_object());
}
