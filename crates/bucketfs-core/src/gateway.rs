//! Transport gateway: URL building, body normalization, error classification.
//!
//! Every backend call goes through [`Gateway::request`]:
//!
//! 1. The endpoint is joined under `<base_url>/<namespace>/` and rejected if it
//!    would resolve anywhere else.
//! 2. The response body is read once. A body declared as JSON is parsed;
//!    when parsing fails the raw text is returned instead (a mislabeled body
//!    is never dropped).
//! 3. Non-2xx statuses become [`GatewayError::Response`]; no response at all
//!    becomes [`GatewayError::Network`]. Nothing is retried.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};

const JSON_CONTENT_TYPE: &str = "application/json";

// =============================================================================
// Body
// =============================================================================

/// A normalized response body.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    /// Body declared as JSON that parsed successfully
    Json(Value),
    /// Any other body, including JSON-labeled bodies that failed to parse
    Text(String),
}

impl Body {
    /// Deserialize a JSON body into `T`.
    ///
    /// Returns `None` for text bodies or shape mismatches.
    pub fn parse<T: DeserializeOwned>(&self) -> Option<T> {
        match self {
            Self::Json(value) => serde_json::from_value(value.clone()).ok(),
            Self::Text(_) => None,
        }
    }

    /// Server-reported message (`message`, then `error` field).
    pub fn message(&self) -> Option<String> {
        let Self::Json(Value::Object(map)) = self else {
            return None;
        };
        ["message", "error"]
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_str))
            .map(str::to_string)
    }

    /// Error reported inside a success payload (`{"error": ...}`).
    pub fn embedded_error(&self) -> Option<String> {
        match self {
            Self::Json(Value::Object(map)) => map.get("error").map(|e| match e {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
            _ => None,
        }
    }

    /// Text form of the body (JSON is re-serialized).
    pub fn to_text(&self) -> String {
        match self {
            Self::Json(Value::String(s)) => s.clone(),
            Self::Json(value) => value.to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

// =============================================================================
// Request Init
// =============================================================================

/// Per-request options: method, query parameters and JSON body.
#[derive(Clone, Debug)]
pub struct RequestInit {
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestInit {
    /// A GET request.
    pub fn get() -> Self {
        Self {
            method: Method::Get,
            query: Vec::new(),
            body: None,
        }
    }

    /// A POST request without body.
    pub fn post() -> Self {
        Self {
            method: Method::Post,
            ..Self::get()
        }
    }

    /// A POST request with a JSON body.
    pub fn post_json<B: Serialize>(body: &B) -> Result<Self, GatewayError> {
        let value = serde_json::to_value(body).map_err(|e| GatewayError::Encode(e.to_string()))?;
        Ok(Self {
            body: Some(value),
            ..Self::post()
        })
    }

    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }
}

impl Default for RequestInit {
    fn default() -> Self {
        Self::get()
    }
}

// =============================================================================
// Gateway
// =============================================================================

/// Issues requests into the storage API namespace.
pub struct Gateway<T> {
    transport: T,
    /// Namespace root, always ending with `/`
    root: Url,
}

impl<T: Transport> Gateway<T> {
    /// Create a gateway for `config`.
    ///
    /// Fails when the base URL does not parse.
    pub fn new(config: &GatewayConfig, transport: T) -> Result<Self, GatewayError> {
        let invalid = || GatewayError::InvalidEndpoint(config.base_url.clone());

        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).map_err(|_| invalid())?;

        let namespace = config.namespace.trim_matches('/');
        let root = if namespace.is_empty() {
            base
        } else {
            base.join(&format!("{}/", namespace)).map_err(|_| invalid())?
        };

        Ok(Self { transport, root })
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the absolute URL of an endpoint.
    ///
    /// Endpoints resolving outside of the namespace are rejected: `..`
    /// segments, absolute or scheme-relative URLs, and a query or fragment
    /// smuggled into the path.
    pub fn endpoint_url(&self, endpoint: &str, query: &[(String, String)]) -> Result<Url, GatewayError> {
        let rejected = || GatewayError::InvalidEndpoint(endpoint.to_string());

        if endpoint.contains(['?', '#', '\\']) || endpoint.starts_with("//") {
            return Err(rejected());
        }

        let relative = endpoint.trim_start_matches('/');
        let mut url = self.root.join(relative).map_err(|_| rejected())?;

        let same_origin = url.origin() == self.root.origin();
        if !same_origin || !url.path().starts_with(self.root.path()) {
            return Err(rejected());
        }

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Send a request to `endpoint` and normalize the answer.
    pub async fn request(&self, endpoint: &str, init: RequestInit) -> Result<Body, GatewayError> {
        let url = self.endpoint_url(endpoint, &init.query)?.to_string();
        let request = HttpRequest {
            method: init.method,
            url: url.clone(),
            body: init.body.map(|body| body.to_string()),
        };

        tracing::debug!("request started: {} {}", request.method, url);

        let response = self.transport.send(request).await.map_err(|err| {
            tracing::warn!("request failed: {} unreachable: {}", url, err);
            GatewayError::Network {
                url: url.clone(),
                cause: err.0,
            }
        })?;

        let body = normalize_body(&url, &response);

        if !response.ok() {
            let message = body.message().unwrap_or_else(|| body.to_text());
            tracing::warn!("request rejected: {} {} {}", url, response.status, message);
            return Err(GatewayError::Response {
                status: response.status,
                status_text: response.status_text,
                message,
                body,
            });
        }

        tracing::debug!("request ended: {} {}", url, response.status);
        Ok(body)
    }
}

/// Interpret a response body according to its declared content type.
fn normalize_body(url: &str, response: &HttpResponse) -> Body {
    let declared_json = response
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.to_ascii_lowercase().contains(JSON_CONTENT_TYPE));

    if !declared_json || response.body.is_empty() {
        return Body::Text(response.body.clone());
    }

    match serde_json::from_str::<Value>(&response.body) {
        Ok(value) => Body::Json(value),
        Err(err) => {
            tracing::warn!("response from {} labeled JSON but not parseable ({}), using raw text", url, err);
            Body::Text(response.body.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::transport::TransportError;

    /// Answers every request with a canned result and records what was sent.
    struct StubTransport {
        answer: Result<HttpResponse, TransportError>,
        sent: RefCell<Vec<HttpRequest>>,
    }

    impl StubTransport {
        fn responding(status: u16, content_type: Option<&str>, body: &str) -> Self {
            Self {
                answer: Ok(HttpResponse {
                    status,
                    status_text: match status {
                        200 => "OK",
                        404 => "Not Found",
                        _ => "Internal Server Error",
                    }
                    .to_string(),
                    content_type: content_type.map(str::to_string),
                    body: body.to_string(),
                }),
                sent: RefCell::new(Vec::new()),
            }
        }

        fn unreachable() -> Self {
            Self {
                answer: Err(TransportError::new("connection refused")),
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for StubTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.sent.borrow_mut().push(request);
            self.answer.clone()
        }
    }

    fn gateway(transport: StubTransport) -> Gateway<StubTransport> {
        Gateway::new(&GatewayConfig::new("http://localhost:8888/lab"), transport).unwrap()
    }

    #[test]
    fn test_endpoint_url_joins_namespace() {
        let gw = gateway(StubTransport::unreachable());
        let url = gw
            .endpoint_url(
                "api/storage/listFiles",
                &[("prefix".to_string(), "a b/".to_string())],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8888/lab/bucketfs/api/storage/listFiles?prefix=a+b%2F"
        );
    }

    #[test]
    fn test_endpoint_url_rejects_traversal() {
        let gw = gateway(StubTransport::unreachable());
        for endpoint in [
            "../admin",
            "api/../../x",
            "%2e%2e/x",
            "http://evil.example/",
            "//evil.example/x",
            "///evil.example/x",
            "credentials?x=1",
        ] {
            assert!(
                matches!(
                    gw.endpoint_url(endpoint, &[]),
                    Err(GatewayError::InvalidEndpoint(_))
                ),
                "{} should be rejected",
                endpoint
            );
        }
    }

    #[tokio::test]
    async fn test_json_body_is_parsed() {
        let gw = gateway(StubTransport::responding(
            200,
            Some("application/json; charset=UTF-8"),
            r#"[{"name":"b1"}]"#,
        ));
        let body = gw.request("api/storage/listBuckets", RequestInit::get()).await.unwrap();
        assert_eq!(body, Body::Json(serde_json::json!([{"name": "b1"}])));
    }

    #[tokio::test]
    async fn test_mislabeled_json_degrades_to_text() {
        let gw = gateway(StubTransport::responding(200, Some("application/json"), "aGVsbG8="));
        let body = gw.request("api/storage/loadFile", RequestInit::get()).await.unwrap();
        assert_eq!(body, Body::Text("aGVsbG8=".to_string()));
    }

    #[tokio::test]
    async fn test_plain_text_is_not_parsed() {
        let gw = gateway(StubTransport::responding(200, Some("text/plain"), r#"{"a":1}"#));
        let body = gw.request("x", RequestInit::get()).await.unwrap();
        assert_eq!(body, Body::Text(r#"{"a":1}"#.to_string()));
    }

    #[tokio::test]
    async fn test_error_status_carries_server_message() {
        let gw = gateway(StubTransport::responding(
            404,
            Some("application/json"),
            r#"{"error":"bucket b9 not found"}"#,
        ));
        let err = gw.request("api/storage/listFiles", RequestInit::get()).await.unwrap_err();
        match err {
            GatewayError::Response {
                status,
                status_text,
                message,
                ..
            } => {
                assert_eq!(status, 404);
                assert_eq!(status_text, "Not Found");
                assert_eq!(message, "bucket b9 not found");
            }
            other => panic!("expected response error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_status_with_text_body_uses_raw_text() {
        let gw = gateway(StubTransport::responding(500, None, "upstream exploded"));
        let err = gw.request("x", RequestInit::get()).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("upstream exploded"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let gw = gateway(StubTransport::unreachable());
        let err = gw.request("credentials", RequestInit::get()).await.unwrap_err();
        assert!(err.is_network());
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_post_json_sends_serialized_body() {
        let gw = gateway(StubTransport::responding(200, Some("application/json"), "{}"));
        let init = RequestInit::post_json(&serde_json::json!({"bucket": "b1"})).unwrap();
        gw.request("api/storage/deleteFile", init).await.unwrap();

        let sent = gw.transport().sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::Post);
        assert_eq!(sent[0].body.as_deref(), Some(r#"{"bucket":"b1"}"#));
    }

    #[tokio::test]
    async fn test_invalid_endpoint_never_reaches_transport() {
        let gw = gateway(StubTransport::responding(200, None, ""));
        let err = gw.request("../../etc", RequestInit::get()).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidEndpoint(_)));
        assert!(gw.transport().sent.borrow().is_empty());
    }
}
