//! Route-guard wiring for Leptos.
//!
//! SYSTEM CONTEXT
//! ==============
//! The app shell installs one guard over the router's reactive pathname so
//! every page gets identical admission behavior without checking the session
//! itself.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::logging::warn;
use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::routes::{LOGIN_PATH, RouterGuard};

/// Where `path` should be redirected to, or `None` to let it through.
///
/// A chain that fails to settle is logged and sent to the login page.
#[must_use]
pub fn redirect_target(guard: &RouterGuard, path: &str) -> Option<&'static str> {
    match guard.navigate(path) {
        Ok(nav) if nav.redirected => Some(nav.target),
        Ok(_) => None,
        Err(e) => {
            warn!("{e}");
            Some(LOGIN_PATH)
        }
    }
}

/// Re-run the guard whenever `pathname` changes and replace the history
/// entry on redirect, so the back button does not bounce through it.
pub fn install_route_guard<F>(guard: RouterGuard, pathname: Signal<String>, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        let path = pathname.get();
        if let Some(target) = redirect_target(&guard, &path) {
            navigate(target, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
}
