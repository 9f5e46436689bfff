//! Helpers that bind the pure client core to the Leptos reactive runtime.

pub mod auth;
