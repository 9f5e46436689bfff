//! Single request path for every backend call.
//!
//! DESIGN
//! ======
//! One credential mechanism: if the session store holds a token, the request
//! carries `Authorization: Bearer <token>`. Ambient platform credentials
//! (cookies) follow the configured [`CredentialsMode`] for every call rather
//! than per call site.
//!
//! ERROR HANDLING
//! ==============
//! Responses are parsed as JSON before the status is inspected. An unreadable
//! body is `status 0` whatever the HTTP status was; a readable non-2xx body
//! becomes `RequestError { status, message }`. Transport failures are
//! `status -1`. Nothing here panics or propagates past the returned `Result`.

#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod dispatcher_test;

use std::future::Future;
use std::rc::Rc;

use futures::future::{AbortRegistration, Abortable};
use leptos::logging::{log, warn};
use serde_json::Value;

use super::error::{ApiError, RequestError};
use super::request::RequestDescriptor;
use super::transport::{CredentialsMode, HttpRequest, HttpResponse, Transport};
use crate::config::ClientConfig;
use crate::state::session::SessionStore;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Resolves, authenticates, sends and normalizes requests.
#[derive(Clone)]
pub struct Dispatcher {
    base_url: Rc<str>,
    credentials: CredentialsMode,
    session: SessionStore,
    transport: Rc<dyn Transport>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(config: &ClientConfig, session: SessionStore, transport: Rc<dyn Transport>) -> Self {
        Self {
            base_url: Rc::from(config.base_url.trim_end_matches('/')),
            credentials: CredentialsMode::from_include(config.include_credentials),
            session,
            transport,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `request` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] for transport failures, unreadable bodies
    /// and non-2xx statuses.
    pub async fn send(&self, request: RequestDescriptor) -> Result<Value, RequestError> {
        let response = self.execute(request).await?;
        decode_response(&response)
    }

    /// Send `request` and return the raw body of a 2xx response.
    ///
    /// # Errors
    ///
    /// Failures are normalized exactly like [`Dispatcher::send`].
    pub async fn send_bytes(&self, request: RequestDescriptor) -> Result<Vec<u8>, RequestError> {
        let response = self.execute(request).await?;
        if response.is_success() {
            Ok(response.body)
        } else {
            Err(error_from_body(response.status, &response.body))
        }
    }

    /// Resolve URL, headers and body for `request` without sending it.
    #[must_use]
    pub fn prepare(&self, request: RequestDescriptor) -> HttpRequest {
        let (method, target, body, extra_headers) = request.into_parts();

        let mut headers = vec![("Content-Type".to_owned(), JSON_CONTENT_TYPE.to_owned())];
        if let Some(token) = self.session.token() {
            headers.push(("Authorization".to_owned(), format!("Bearer {token}")));
        }
        headers.extend(extra_headers);

        HttpRequest {
            method,
            url: format!("{}{}", self.base_url, target),
            headers,
            body: body.map(super::request::Body::into_text),
            credentials: self.credentials,
        }
    }

    async fn execute(&self, request: RequestDescriptor) -> Result<HttpResponse, RequestError> {
        let http = self.prepare(request);
        let method = http.method;
        let url = without_query(&http.url).to_owned();
        if cfg!(debug_assertions) {
            log!("dispatch {method} {url}");
        }

        let response = self.transport.execute(http).await.map_err(|e| {
            warn!("request failed: {method} {url}: {e}");
            RequestError::network(e.0)
        })?;
        if !response.is_success() {
            warn!("request rejected: {method} {url}: HTTP {}", response.status);
        }
        Ok(response)
    }
}

/// `url` up to its query string. Search terms can carry patient names and
/// must not reach the console.
fn without_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

/// Normalize a raw response into a JSON value or a [`RequestError`].
///
/// # Errors
///
/// See the module-level error handling notes.
pub fn decode_response(response: &HttpResponse) -> Result<Value, RequestError> {
    let value: Value = serde_json::from_slice(&response.body).map_err(|_| RequestError::invalid_body())?;
    if response.is_success() {
        Ok(value)
    } else {
        Err(rejection(response.status, &value))
    }
}

fn error_from_body(status: u16, body: &[u8]) -> RequestError {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => rejection(status, &value),
        Err(_) => RequestError::invalid_body(),
    }
}

fn rejection(status: u16, body: &Value) -> RequestError {
    RequestError::http(status, body.get("message").and_then(Value::as_str))
}

/// Run `future` until it resolves or the matching `AbortHandle` fires.
///
/// On abort the future is dropped mid-flight, so none of its remaining steps
/// (response decoding, session writes) run.
///
/// # Errors
///
/// Returns [`ApiError::Aborted`] on abort, otherwise the future's own error.
pub async fn cancellable<T, F>(future: F, registration: AbortRegistration) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    Abortable::new(future, registration)
        .await
        .unwrap_or(Err(ApiError::Aborted))
}
