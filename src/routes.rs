//! Route table and navigation guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every navigation is checked against the static [`ROUTES`] table. Each
//! route carries a [`RouteMeta`] saying whether it needs a session, needs the
//! absence of one (login pages), or neither.
//!
//! DESIGN
//! ======
//! `decide` is a pure function of the route meta and the [`AuthGate`] result.
//! `RouterGuard::navigate` layers path normalization and the catch-all
//! redirect on top and follows the resulting chain to a final target. The
//! chain is bounded; the table itself is tested to settle in a few hops.
//!
//! The guard never touches the session. Clearing a stale token after a 401
//! is the caller's job.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use crate::state::auth::AuthGate;

/// Where unauthenticated visitors to protected routes are sent.
pub const LOGIN_PATH: &str = "/login";
/// Where signed-in visitors to guest routes are sent. Also the catch-all target.
pub const LANDING_PATH: &str = "/dashboard";
/// Upper bound on redirects followed by one navigation.
pub const MAX_HOPS: usize = 4;

// =============================================================================
// TABLE
// =============================================================================

/// Admission flags for a route. Never both set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_guest: bool,
}

impl RouteMeta {
    pub const PUBLIC: Self = Self { requires_auth: false, requires_guest: false };
    pub const AUTH: Self = Self { requires_auth: true, requires_guest: false };
    pub const GUEST: Self = Self { requires_auth: false, requires_guest: true };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub meta: RouteMeta,
}

const fn route(path: &'static str, name: &'static str, meta: RouteMeta) -> Route {
    Route { path, name, meta }
}

pub static ROUTES: &[Route] = &[
    route("/", "Home", RouteMeta::PUBLIC),
    route("/login", "Login", RouteMeta::GUEST),
    route("/admin/login", "AdminLogin", RouteMeta::GUEST),
    route("/dashboard", "Dashboard", RouteMeta::AUTH),
    route("/departments", "Departments", RouteMeta::AUTH),
    route("/admin/activities", "Activities", RouteMeta::AUTH),
    route("/admin/knowledge", "Knowledge", RouteMeta::AUTH),
    route("/admin/guidelines", "Guidelines", RouteMeta::AUTH),
    route("/admin/users", "Users", RouteMeta::AUTH),
    route("/contacts", "Contacts", RouteMeta::AUTH),
    route("/cases", "Cases", RouteMeta::AUTH),
    route("/backups", "Backups", RouteMeta::AUTH),
];

/// Strip query string, fragment and trailing `/` so `/cases/?page=2#top`
/// matches `/cases`.
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// Exact match on the normalized path. `None` means the catch-all applies.
#[must_use]
pub fn find_route(path: &str) -> Option<&'static Route> {
    let path = normalize_path(path);
    ROUTES.iter().find(|route| route.path == path)
}

// =============================================================================
// DECISION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectTo(&'static str),
}

/// Admission policy for one route given the current authentication result.
#[must_use]
pub fn decide(meta: RouteMeta, authenticated: bool) -> GuardDecision {
    if meta.requires_auth && !authenticated {
        GuardDecision::RedirectTo(LOGIN_PATH)
    } else if meta.requires_guest && authenticated {
        GuardDecision::RedirectTo(LANDING_PATH)
    } else {
        GuardDecision::Allow
    }
}

/// Final outcome of a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    /// Canonical path of the route that was finally admitted.
    pub target: &'static str,
    /// True when the target differs from what was asked for.
    pub redirected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("navigation to {0} did not settle within {MAX_HOPS} redirects")]
    TooManyRedirects(String),
}

// =============================================================================
// GUARD
// =============================================================================

/// Evaluates navigations against the route table and the auth gate.
#[derive(Debug, Clone)]
pub struct RouterGuard {
    gate: AuthGate,
}

impl RouterGuard {
    #[must_use]
    pub fn new(gate: AuthGate) -> Self {
        Self { gate }
    }

    /// Decide a single route using the live gate result.
    #[must_use]
    pub fn decide(&self, meta: RouteMeta) -> GuardDecision {
        decide(meta, self.gate.is_authenticated())
    }

    /// Resolve `path` to the route the visitor actually ends up on.
    ///
    /// # Errors
    ///
    /// [`RouteError::TooManyRedirects`] if the chain does not settle within
    /// [`MAX_HOPS`] steps.
    pub fn navigate(&self, path: &str) -> Result<Navigation, RouteError> {
        let authenticated = self.gate.is_authenticated();
        let requested = normalize_path(path);
        let mut current = requested;

        for _ in 0..=MAX_HOPS {
            let Some(route) = find_route(current) else {
                current = LANDING_PATH;
                continue;
            };
            match decide(route.meta, authenticated) {
                GuardDecision::Allow => {
                    return Ok(Navigation { target: route.path, redirected: route.path != requested });
                }
                GuardDecision::RedirectTo(next) => current = next,
            }
        }
        Err(RouteError::TooManyRedirects(path.to_owned()))
    }
}
