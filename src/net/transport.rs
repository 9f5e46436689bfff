//! Platform HTTP seam.
//!
//! ARCHITECTURE
//! ============
//! The dispatcher never touches `fetch` directly; it hands a fully resolved
//! [`HttpRequest`] to a [`Transport`]. The browser build plugs in
//! [`FetchTransport`] (gloo-net), tests plug in a scripted mock. Futures are
//! `?Send` because browser fetch futures are bound to the UI thread.

use async_trait::async_trait;

use super::request::Method;

/// Whether the platform attaches ambient credentials (cookies) to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialsMode {
    /// Send cookies cross-origin too; needed when the API lives on another port.
    #[default]
    Include,
    /// Cookies only for same-origin requests.
    SameOrigin,
}

impl CredentialsMode {
    #[must_use]
    pub fn from_include(include: bool) -> Self {
        if include { Self::Include } else { Self::SameOrigin }
    }
}

/// A request with absolute URL, final headers and serialized body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub credentials: CredentialsMode,
}

impl HttpRequest {
    /// First header value matching `name` (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw status and body bytes as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request produced no HTTP response at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Executes one HTTP exchange.
#[async_trait(?Send)]
pub trait Transport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Browser `fetch` transport via `gloo-net`.
#[cfg(feature = "hydrate")]
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

#[cfg(feature = "hydrate")]
#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        use gloo_net::http::{Method as FetchMethod, RequestBuilder};

        let method = match request.method {
            Method::Get => FetchMethod::GET,
            Method::Post => FetchMethod::POST,
            Method::Put => FetchMethod::PUT,
            Method::Delete => FetchMethod::DELETE,
        };
        let credentials = match request.credentials {
            CredentialsMode::Include => web_sys::RequestCredentials::Include,
            CredentialsMode::SameOrigin => web_sys::RequestCredentials::SameOrigin,
        };

        let mut builder = RequestBuilder::new(&request.url)
            .method(method)
            .credentials(credentials);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        let fetch = match request.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|e| TransportError(e.to_string()))?;

        let resp = fetch
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .binary()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}
