//! Immutable request descriptors handed to the dispatcher.
//!
//! DESIGN
//! ======
//! A descriptor is validated once when built and then moved into
//! `Dispatcher::send`, so a malformed request never reaches the wire and a
//! descriptor cannot be sent twice. Credential and content-type headers are
//! reserved: only the dispatcher sets them.

#[cfg(test)]
#[path = "request_test.rs"]
mod request_test;

use serde::Serialize;
use serde_json::Value;

/// HTTP methods used by the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    fn allows_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload. Structured values are serialized by the dispatcher;
/// text is sent as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

impl Body {
    /// Wire text for this body.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Json(value) => value.to_string(),
            Self::Text(text) => text,
        }
    }
}

/// Request construction failures. These are fatal to the call; nothing is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("request path is empty")]
    EmptyPath,

    #[error("request path must start with '/': {0}")]
    RelativePath(String),

    #[error("request path must not carry a query or fragment: {0}")]
    PathContainsQuery(String),

    /// An id or filename interpolated into a path was blank.
    #[error("path segment `{0}` is empty")]
    EmptySegment(&'static str),

    /// `.` and `..` would be collapsed by URL resolution into another path.
    #[error("path segment `{0}` is a dot segment")]
    DotSegment(&'static str),

    #[error("query parameter name is empty")]
    EmptyQueryKey,

    #[error("{0} requests cannot carry a body")]
    BodyNotAllowed(Method),

    #[error("invalid header name: {0:?}")]
    InvalidHeaderName(String),

    #[error("invalid value for header {0}")]
    InvalidHeaderValue(String),

    /// `Authorization` and `Content-Type` belong to the dispatcher.
    #[error("header {0} is set by the dispatcher")]
    ReservedHeader(String),

    #[error("request body serialization failed: {0}")]
    Body(String),
}

const RESERVED_HEADERS: [&str; 2] = ["authorization", "content-type"];

/// A fully validated request: method, path, ordered query, optional body and
/// extra headers.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Body>,
    headers: Vec<(String, String)>,
}

impl RequestDescriptor {
    /// Start building a request for `method` and `path`.
    pub fn builder(method: Method, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            method,
            path: path.into(),
            query: Vec::new(),
            body: Ok(None),
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> RequestBuilder {
        Self::builder(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> RequestBuilder {
        Self::builder(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> RequestBuilder {
        Self::builder(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> RequestBuilder {
        Self::builder(Method::Delete, path)
    }

    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    #[must_use]
    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Path plus encoded query string, e.g. `/api/admin/cases?status=open`.
    #[must_use]
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, encode_query(&self.query))
        }
    }

    pub(crate) fn into_parts(self) -> (Method, String, Option<Body>, Vec<(String, String)>) {
        let target = self.path_and_query();
        (self.method, target, self.body, self.headers)
    }
}

/// Accumulates request parts; validation happens in [`RequestBuilder::build`].
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Result<Option<Body>, ValidationError>,
    headers: Vec<(String, String)>,
}

impl RequestBuilder {
    /// Append one query parameter; order of calls is kept on the wire.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append every pair from `params` in iteration order.
    #[must_use]
    pub fn query_pairs<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Attach a structured JSON body.
    #[must_use]
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.body = serde_json::to_value(body)
            .map(|value| Some(Body::Json(value)))
            .map_err(|e| ValidationError::Body(e.to_string()));
        self
    }

    /// Attach pre-serialized body text.
    #[must_use]
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Ok(Some(Body::Text(body.into())));
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Validate and freeze the request.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn build(self) -> Result<RequestDescriptor, ValidationError> {
        validate_path(&self.path)?;
        if self.query.iter().any(|(key, _)| key.is_empty()) {
            return Err(ValidationError::EmptyQueryKey);
        }
        for (name, value) in &self.headers {
            validate_header(name, value)?;
        }
        let body = self.body?;
        if body.is_some() && !self.method.allows_body() {
            return Err(ValidationError::BodyNotAllowed(self.method));
        }
        Ok(RequestDescriptor {
            method: self.method,
            path: self.path,
            query: self.query,
            body,
            headers: self.headers,
        })
    }
}

fn validate_path(path: &str) -> Result<(), ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::EmptyPath);
    }
    if !path.starts_with('/') {
        return Err(ValidationError::RelativePath(path.to_owned()));
    }
    if path.contains(['?', '#']) {
        return Err(ValidationError::PathContainsQuery(path.to_owned()));
    }
    Ok(())
}

fn validate_header(name: &str, value: &str) -> Result<(), ValidationError> {
    let valid_name = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b));
    if !valid_name {
        return Err(ValidationError::InvalidHeaderName(name.to_owned()));
    }
    if RESERVED_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
        return Err(ValidationError::ReservedHeader(name.to_owned()));
    }
    if value.contains(['\r', '\n']) {
        return Err(ValidationError::InvalidHeaderValue(name.to_owned()));
    }
    Ok(())
}

/// Percent-encode query pairs, preserving their order.
#[must_use]
pub fn encode_query(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Encode a caller-supplied id or filename for use as one path segment.
///
/// # Errors
///
/// Returns [`ValidationError::EmptySegment`] for blank input and
/// [`ValidationError::DotSegment`] for `.` or `..`.
pub fn segment(name: &'static str, raw: &str) -> Result<String, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::EmptySegment(name));
    }
    if matches!(raw, "." | "..") {
        return Err(ValidationError::DotSegment(name));
    }
    Ok(urlencoding::encode(raw).into_owned())
}
