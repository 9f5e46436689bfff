//! Networking modules for the admin REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `request` builds immutable request descriptors, `transport` is the seam to
//! the platform HTTP stack, `dispatcher` attaches credentials and normalizes
//! responses, and `api` is the named-operation facade UI code calls.

pub mod api;
pub mod dispatcher;
pub mod error;
pub mod request;
pub mod transport;
pub mod types;
