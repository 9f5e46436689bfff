//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! `session` owns the stored credential; `auth` is the read-only gate built
//! on top of it.

pub mod auth;
pub mod session;
