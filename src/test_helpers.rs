//! Scripted transport and fixtures shared by unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::net::api::AdminApi;
use crate::net::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::state::session::{KeyValueStorage, SessionError, SessionStore, Tier};

pub const BASE_URL: &str = "http://api.test";

// =========================================================================
// MockTransport
// =========================================================================

/// Replays queued responses in order and records every request it sees.
/// With an empty queue it answers `200 {"success": true}`.
#[derive(Default)]
pub struct MockTransport {
    responses: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn push_json(&self, status: u16, body: &Value) -> &Self {
        self.push_raw(status, body.to_string().as_bytes())
    }

    pub fn push_raw(&self, status: u16, body: &[u8]) -> &Self {
        self.responses
            .borrow_mut()
            .push_back(Ok(HttpResponse { status, body: body.to_vec() }));
        self
    }

    pub fn push_failure(&self, cause: &str) -> &Self {
        self.responses
            .borrow_mut()
            .push_back(Err(TransportError(cause.to_owned())));
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(request);
        self.responses.borrow_mut().pop_front().unwrap_or_else(|| {
            Ok(HttpResponse { status: 200, body: br#"{"success":true}"#.to_vec() })
        })
    }
}

// =========================================================================
// RejectingStorage
// =========================================================================

/// A tier that is always empty and refuses every write, like a full or
/// privacy-mode `localStorage`.
pub struct RejectingStorage(pub Tier);

impl KeyValueStorage for RejectingStorage {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), SessionError> {
        Err(SessionError::WriteRejected(self.0))
    }

    fn remove(&self, _key: &str) {}
}

// =========================================================================
// fixtures
// =========================================================================

pub fn test_config() -> ClientConfig {
    ClientConfig::new(BASE_URL).unwrap()
}

/// Facade wired to a fresh in-memory session and the given mock.
pub fn test_api(transport: &Rc<MockTransport>) -> AdminApi {
    let config = test_config();
    let session = SessionStore::in_memory(&config.token_key);
    AdminApi::new(&config, session, transport.clone())
}
