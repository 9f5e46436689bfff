//! Normalized failure shapes for dispatched requests.
//!
//! ERROR HANDLING
//! ==============
//! Every ordinary HTTP failure comes back as a [`RequestError`] value rather
//! than a panic. The status field doubles as the category:
//! `>= 400` backend rejection, `0` unreadable response body, `-1` transport
//! failure (DNS, refused connection, platform timeout, abort at the fetch
//! layer).

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use super::request::ValidationError;
use crate::state::session::SessionError;

/// Status used when the response body could not be decoded.
pub const STATUS_INVALID_BODY: i32 = 0;
/// Status used when the request never produced an HTTP response.
pub const STATUS_NETWORK: i32 = -1;

const INVALID_BODY_MESSAGE: &str = "invalid response body";

/// A request that reached the dispatcher but did not yield a usable success.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (status {status})")]
pub struct RequestError {
    pub status: i32,
    pub message: String,
}

impl RequestError {
    /// Backend rejection with an explicit or generic message.
    pub fn http(status: u16, message: Option<&str>) -> Self {
        let message = message.map_or_else(|| format!("HTTP error {status}"), str::to_owned);
        Self { status: i32::from(status), message }
    }

    #[must_use]
    pub fn invalid_body() -> Self {
        Self { status: STATUS_INVALID_BODY, message: INVALID_BODY_MESSAGE.to_owned() }
    }

    pub fn network(cause: impl Into<String>) -> Self {
        Self { status: STATUS_NETWORK, message: cause.into() }
    }

    #[must_use]
    pub fn is_network(&self) -> bool {
        self.status == STATUS_NETWORK
    }

    #[must_use]
    pub fn is_invalid_body(&self) -> bool {
        self.status == STATUS_INVALID_BODY
    }

    /// 401/403: the UI should treat the current session as invalid.
    #[must_use]
    pub fn is_session_invalid(&self) -> bool {
        matches!(self.status, 401 | 403)
    }
}

/// Error returned by facade operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request was malformed and never sent.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("request failed: {0}")]
    Request(#[from] RequestError),

    /// The session credential could not be persisted.
    #[error("session storage failed: {0}")]
    Session(#[from] SessionError),

    /// The caller aborted the call before it resolved.
    #[error("request aborted")]
    Aborted,
}

impl ApiError {
    /// Status of the underlying [`RequestError`], if any.
    #[must_use]
    pub fn status(&self) -> Option<i32> {
        match self {
            Self::Request(err) => Some(err.status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_session_invalid(&self) -> bool {
        matches!(self, Self::Request(err) if err.is_session_invalid())
    }
}
