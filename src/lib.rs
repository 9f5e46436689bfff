//! # clinic-admin-client
//!
//! Leptos + WASM client core for the hospital administration portal
//! (departments, contacts, patient cases, backups, knowledge base, users).
//!
//! This crate owns the browser-side session, the route guard, and a single
//! request dispatcher that every named backend operation funnels through.
//! UI components consume [`net::api::AdminApi`] and [`routes::RouterGuard`];
//! they never talk to the dispatcher or storage directly.

pub mod config;
pub mod net;
pub mod routes;
pub mod state;
pub mod util;

#[cfg(test)]
pub(crate) mod test_helpers;
