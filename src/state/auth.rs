//! Optimistic client-side authentication check.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by the route guard to admit or redirect navigations. The gate only
//! looks at local storage: a revoked or expired token still passes, and the
//! backend's 401/403 on the next call is the authority.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use super::session::SessionStore;

/// Pure predicate over the session store. No network access.
#[derive(Debug, Clone)]
pub struct AuthGate {
    session: SessionStore,
}

impl AuthGate {
    #[must_use]
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_some()
    }
}
