//! Browser Fetch API transport.

use gloo_net::http::{Request, RequestBuilder};

use super::{HttpRequest, HttpResponse, Method, Transport, TransportError};

/// [`Transport`] backed by `window.fetch` through gloo-net.
///
/// Cookies of the serving origin are sent along, so the server-side session
/// authenticates the calls. No timeout is applied on top of the browser's own.
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchTransport;

impl FetchTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let builder = match request.method {
            Method::Get => Request::get(&request.url),
            Method::Post => Request::post(&request.url),
        };
        let builder: RequestBuilder = builder.header("Accept", "application/json, text/plain, */*");

        let sent = match request.body {
            Some(body) => {
                let request = builder
                    .header("Content-Type", "application/json")
                    .body(body)
                    .map_err(|e| TransportError::new(e.to_string()))?;
                request.send().await
            }
            None => builder.send().await,
        };
        let response = sent.map_err(|e| TransportError::new(e.to_string()))?;

        let status = response.status();
        let status_text = response.status_text();
        let content_type = response.headers().get("content-type");

        // A body that cannot be read to the end counts as no response
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(format!("failed to read response: {}", e)))?;

        Ok(HttpResponse {
            status,
            status_text,
            content_type,
            body,
        })
    }
}
