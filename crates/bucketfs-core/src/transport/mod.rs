//! Raw HTTP exchange underneath the [`Gateway`](crate::Gateway).
//!
//! A [`Transport`] sends one request and hands back the status line,
//! declared content type and full body text. It performs no interpretation;
//! content sniffing and error classification happen in the gateway.

mod fetch;

pub use fetch::FetchTransport;

use std::fmt;

/// HTTP methods used by the storage API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// A fully built request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL including the query string
    pub url: String,
    /// JSON body, if any
    pub body: Option<String>,
}

/// A received response with its body read to the end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    /// Declared `Content-Type` header
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    /// True for 2xx statuses.
    #[inline]
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// No response was received. Carries the underlying cause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(cause: impl Into<String>) -> Self {
        Self(cause.into())
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TransportError {}

/// Sends requests to the backing service.
///
/// Futures are not required to be `Send`: everything runs on the single
/// browser event loop.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Send a request and read the whole response body once.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
