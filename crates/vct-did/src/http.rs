//! # Universal Resolver HTTP Binding
//!
//! `GET {endpoint}{did}` with `Accept: application/did+ld+json`. The
//! endpoint may answer with a full resolution result
//! (`{didDocument, didResolutionMetadata, didDocumentMetadata}`) or with a
//! bare DID document; both are accepted.
//!
//! The DID is percent-encoded into a single path segment, so `#fragment`
//! and `?query` parts of a DID URL reach the resolver instead of being
//! split off by URL parsing. Existing `%XX` escapes in the DID pass through.
//!
//! The request timeout is owned by this resolver. The verification
//! pipeline itself never times out a resolution.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;
use vct_core::Did;

use crate::document::DidDocument;
use crate::resolver::{DidResolver, ResolutionError, ResolutionResult, TYPE_DID_LD_JSON};

/// Public Universal Resolver endpoint.
pub const DEFAULT_RESOLVER_URL: &str = "https://dev.uniresolver.io/1.0/identifiers/";

/// Request timeout used when a caller has no preference.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters escaped when a DID is placed in the request path.
const DID_PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/');

/// Resolver backed by a DID Resolution HTTP(S) endpoint.
#[derive(Debug, Clone)]
pub struct HttpDidResolver {
    endpoint: Url,
    client: reqwest::Client,
}

impl HttpDidResolver {
    /// Create a resolver for `endpoint` (e.g.
    /// `https://dev.uniresolver.io/1.0/identifiers/`). A trailing slash is
    /// added when missing.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ResolutionError> {
        let mut endpoint = endpoint.trim().to_string();
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| ResolutionError::Transport(format!("invalid resolver URL: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ResolutionError::Transport(e.to_string()))?;
        Ok(Self { endpoint, client })
    }

    /// The configured endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_url(&self, did: &Did) -> Result<Url, ResolutionError> {
        let encoded = utf8_percent_encode(did.as_str(), DID_PATH_SEGMENT);
        Url::parse(&format!("{}{encoded}", self.endpoint))
            .map_err(|e| ResolutionError::InvalidDid(format!("{did}: {e}")))
    }
}

#[async_trait]
impl DidResolver for HttpDidResolver {
    async fn resolve(&self, did: &str) -> Result<ResolutionResult, ResolutionError> {
        let parsed = Did::new(did).map_err(|_| ResolutionError::InvalidDid(did.to_string()))?;
        let url = self.request_url(&parsed)?;
        tracing::debug!(%url, "resolving DID over HTTP");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, TYPE_DID_LD_JSON)
            .send()
            .await
            .map_err(|e| ResolutionError::Transport(e.to_string()))?;

        let status = response.status();
        let body: Option<Value> = response.json().await.ok();

        if let Some(code) = body
            .as_ref()
            .and_then(|b| b.pointer("/didResolutionMetadata/error"))
            .and_then(Value::as_str)
        {
            let message = body
                .as_ref()
                .and_then(|b| b.pointer("/didResolutionMetadata/message"))
                .and_then(Value::as_str);
            return Err(ResolutionError::from_metadata(did, code, message));
        }

        if !status.is_success() {
            return Err(match status {
                StatusCode::NOT_FOUND | StatusCode::GONE => ResolutionError::NotFound(did.to_string()),
                StatusCode::BAD_REQUEST => ResolutionError::InvalidDid(did.to_string()),
                StatusCode::NOT_IMPLEMENTED => {
                    ResolutionError::MethodNotSupported(did.to_string())
                }
                other => ResolutionError::Transport(format!("HTTP {other}")),
            });
        }

        let body = body.ok_or_else(|| {
            ResolutionError::InvalidResponse("response body is not JSON".to_string())
        })?;
        parse_resolution_body(body)
    }
}

fn parse_resolution_body(body: Value) -> Result<ResolutionResult, ResolutionError> {
    if body.get("didDocument").is_some() {
        let result: ResolutionResult = serde_json::from_value(body)
            .map_err(|e| ResolutionError::InvalidResponse(e.to_string()))?;
        return Ok(result);
    }
    let document: DidDocument = serde_json::from_value(body)
        .map_err(|e| ResolutionError::InvalidResponse(e.to_string()))?;
    Ok(ResolutionResult::from_document(document))
}
