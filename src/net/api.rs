//! Named backend operations for the admin portal.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AdminApi` is the only entry point UI code uses to reach the backend. Each
//! method pins a method + path template and funnels through the shared
//! [`Dispatcher`], so credential attachment and error normalization happen
//! in exactly one place.
//!
//! ERROR HANDLING
//! ==============
//! Operations return `Result<_, ApiError>`. Login writes the session only
//! after a successful response carrying a token; logout always clears the
//! local session even when the remote call fails. Every operation fails with
//! the [`ApiError`] of its dispatch; only the exceptions are documented.

#![allow(clippy::missing_errors_doc)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::rc::Rc;

use leptos::logging::{log, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::dispatcher::Dispatcher;
use super::error::{ApiError, RequestError};
use super::request::{RequestDescriptor, ValidationError, segment};
use super::transport::Transport;
use super::types::{
    ActionResponse, CaseFilter, CaseInput, ContactFilter, ContactInput, Credentials, CurrentUserResponse,
    DepartmentInput, LoginResponse, UserInput,
};
use crate::config::ClientConfig;
use crate::state::auth::AuthGate;
use crate::state::session::SessionStore;

const ADMIN: &str = "/api/admin";

fn admin_path(resource: &str) -> String {
    format!("{ADMIN}/{resource}")
}

fn admin_item_path(resource: &str, id: i64) -> String {
    format!("{ADMIN}/{resource}/{id}")
}

fn backup_path(filename: &str, action: Option<&str>) -> Result<String, ApiError> {
    let filename = segment("filename", filename)?;
    Ok(match action {
        Some(action) => format!("{ADMIN}/backups/{filename}/{action}"),
        None => format!("{ADMIN}/backups/{filename}"),
    })
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|_| ApiError::Request(RequestError::invalid_body()))
}

/// Admin portal client facade.
#[derive(Clone, Debug)]
pub struct AdminApi {
    dispatcher: Dispatcher,
    session: SessionStore,
    remember_by_default: bool,
}

impl AdminApi {
    pub fn new(config: &ClientConfig, session: SessionStore, transport: Rc<dyn Transport>) -> Self {
        Self {
            dispatcher: Dispatcher::new(config, session.clone(), transport),
            session,
            remember_by_default: config.remember_by_default,
        }
    }

    /// Facade over browser `fetch` and `localStorage`/`sessionStorage`.
    #[cfg(feature = "hydrate")]
    #[must_use]
    pub fn browser(config: &ClientConfig) -> Self {
        let session = SessionStore::browser(&config.token_key);
        Self::new(config, session, Rc::new(super::transport::FetchTransport))
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Gate over this facade's session, for route guards.
    #[must_use]
    pub fn auth_gate(&self) -> AuthGate {
        AuthGate::new(self.session.clone())
    }

    async fn json(&self, request: Result<RequestDescriptor, ValidationError>) -> Result<Value, ApiError> {
        Ok(self.dispatcher.send(request?).await?)
    }

    async fn action(&self, request: Result<RequestDescriptor, ValidationError>) -> Result<ActionResponse, ApiError> {
        decode(self.json(request).await?)
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    /// Log in via `POST /api/admin/auth/login`.
    ///
    /// On `success` with a token the credential replaces any existing one,
    /// in the durable tier when `remember` (or the configured default) is set.
    /// Any other outcome leaves the session untouched.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher error, or [`ApiError::Session`] if the token
    /// could not be stored.
    pub async fn login(&self, username: &str, password: &str, remember: Option<bool>) -> Result<LoginResponse, ApiError> {
        let body = Credentials { username: username.to_owned(), password: password.to_owned() };
        let request = RequestDescriptor::post(admin_path("auth/login")).json(&body).build();
        let response: LoginResponse = decode(self.json(request).await?)?;

        if let Some(token) = response.issued_token() {
            let remember = remember.unwrap_or(self.remember_by_default);
            self.session.replace(token, remember)?;
            log!("logged in as {username} (remember: {remember})");
        }
        Ok(response)
    }

    /// Log out via `POST /api/admin/auth/logout`, then clear the local session.
    ///
    /// A remote failure is reported to the console and otherwise ignored.
    pub async fn logout(&self) {
        let request = RequestDescriptor::post(admin_path("auth/logout")).build();
        if let Err(e) = self.json(request).await {
            warn!("logout call failed: {e}");
        }
        self.session.clear();
        log!("session cleared");
    }

    /// Fetch the signed-in administrator from `GET /api/admin/auth/user`.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher error; 401/403 means the session is invalid.
    pub async fn current_user(&self) -> Result<CurrentUserResponse, ApiError> {
        decode(self.json(RequestDescriptor::get(admin_path("auth/user")).build()).await?)
    }

    // =========================================================================
    // DASHBOARD
    // =========================================================================

    pub async fn dashboard_stats(&self) -> Result<Value, ApiError> {
        self.json(RequestDescriptor::get(admin_path("dashboard/stats")).build()).await
    }

    pub async fn dashboard_activities(&self) -> Result<Value, ApiError> {
        self.json(RequestDescriptor::get(admin_path("dashboard/activities")).build()).await
    }

    // =========================================================================
    // DEPARTMENTS
    // =========================================================================

    pub async fn departments(&self) -> Result<Value, ApiError> {
        self.json(RequestDescriptor::get(admin_path("departments")).build()).await
    }

    pub async fn department(&self, id: i64) -> Result<Value, ApiError> {
        self.json(RequestDescriptor::get(admin_item_path("departments", id)).build()).await
    }

    pub async fn create_department(&self, input: &DepartmentInput) -> Result<ActionResponse, ApiError> {
        self.action(RequestDescriptor::post(admin_path("departments")).json(input).build()).await
    }

    pub async fn update_department(&self, id: i64, input: &DepartmentInput) -> Result<ActionResponse, ApiError> {
        self.action(RequestDescriptor::put(admin_item_path("departments", id)).json(input).build()).await
    }

    pub async fn delete_department(&self, id: i64) -> Result<ActionResponse, ApiError> {
        self.action(RequestDescriptor::delete(admin_item_path("departments", id)).build()).await
    }

    // =========================================================================
    // CONTACTS
    // =========================================================================

    pub async fn contacts(&self, filter: &ContactFilter) -> Result<Value, ApiError> {
        self.json(
            RequestDescriptor::get(admin_path("contacts"))
                .query_pairs(filter.to_query())
                .build(),
        )
        .await
    }

    pub async fn contact(&self, id: i64) -> Result<Value, ApiError> {
        self.json(RequestDescriptor::get(admin_item_path("contacts", id)).build()).await
    }

    pub async fn create_contact(&self, input: &ContactInput) -> Result<ActionResponse, ApiError> {
        self.action(RequestDescriptor::post(admin_path("contacts")).json(input).build()).await
    }

    pub async fn update_contact(&self, id: i64, input: &ContactInput) -> Result<ActionResponse, ApiError> {
        self.action(RequestDescriptor::put(admin_item_path("contacts", id)).json(input).build()).await
    }

    pub async fn delete_contact(&self, id: i64) -> Result<ActionResponse, ApiError> {
        self.action(RequestDescriptor::delete(admin_item_path("contacts", id)).build()).await
    }

    // =========================================================================
    // CASES
    // =========================================================================

    pub async fn cases(&self, filter: &CaseFilter) -> Result<Value, ApiError> {
        self.json(
            RequestDescriptor::get(admin_path("cases"))
                .query_pairs(filter.to_query())
                .build(),
        )
        .await
    }

    pub async fn case(&self, id: i64) -> Result<Value, ApiError> {
        self.json(RequestDescriptor::get(admin_item_path("cases", id)).build()).await
    }

    pub async fn create_case(&self, input: &CaseInput) -> Result<ActionResponse, ApiError> {
        self.action(RequestDescriptor::post(admin_path("cases")).json(input).build()).await
    }

    pub async fn update_case(&self, id: i64, input: &CaseInput) -> Result<ActionResponse, ApiError> {
        self.action(RequestDescriptor::put(admin_item_path("cases", id)).json(input).build()).await
    }

    pub async fn delete_case(&self, id: i64) -> Result<ActionResponse, ApiError> {
        self.action(RequestDescriptor::delete(admin_item_path("cases", id)).build()).await
    }

    // =========================================================================
    // BACKUPS
    // =========================================================================

    pub async fn backups(&self) -> Result<Value, ApiError> {
        self.json(RequestDescriptor::get(admin_path("backups")).build()).await
    }

    pub async fn create_backup(&self) -> Result<ActionResponse, ApiError> {
        self.action(RequestDescriptor::post(admin_path("backups/create")).build()).await
    }

    /// Restore the database from backup `filename`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for a blank filename, otherwise the dispatcher error.
    pub async fn restore_backup(&self, filename: &str) -> Result<ActionResponse, ApiError> {
        let path = backup_path(filename, Some("restore"))?;
        self.action(RequestDescriptor::post(path).build()).await
    }

    pub async fn delete_backup(&self, filename: &str) -> Result<ActionResponse, ApiError> {
        let path = backup_path(filename, None)?;
        self.action(RequestDescriptor::delete(path).build()).await
    }

    /// Download the raw bytes of backup `filename`.
    ///
    /// # Errors
    ///
    /// Failure bodies are normalized like every JSON call.
    pub async fn download_backup(&self, filename: &str) -> Result<Vec<u8>, ApiError> {
        let request = RequestDescriptor::get(backup_path(filename, Some("download"))?).build()?;
        Ok(self.dispatcher.send_bytes(request).await?)
    }

    // =========================================================================
    // CONTENT
    // =========================================================================

    pub async fn activities(&self) -> Result<Value, ApiError> {
        self.json(RequestDescriptor::get(admin_path("activities")).build()).await
    }

    pub async fn delete_activity(&self, id: i64) -> Result<ActionResponse, ApiError> {
        self.action(RequestDescriptor::delete(admin_item_path("activities", id)).build()).await
    }

    pub async fn knowledge(&self) -> Result<Value, ApiError> {
        self.json(RequestDescriptor::get(admin_path("knowledge")).build()).await
    }

    pub async fn delete_knowledge(&self, id: i64) -> Result<ActionResponse, ApiError> {
        self.action(RequestDescriptor::delete(admin_item_path("knowledge", id)).build()).await
    }

    pub async fn guidelines(&self) -> Result<Value, ApiError> {
        self.json(RequestDescriptor::get(admin_path("guidelines")).build()).await
    }

    pub async fn delete_guideline(&self, id: i64) -> Result<ActionResponse, ApiError> {
        self.action(RequestDescriptor::delete(admin_item_path("guidelines", id)).build()).await
    }

    // =========================================================================
    // USERS
    // =========================================================================

    pub async fn users(&self) -> Result<Value, ApiError> {
        self.json(RequestDescriptor::get(admin_path("users")).build()).await
    }

    pub async fn create_user(&self, input: &UserInput) -> Result<ActionResponse, ApiError> {
        self.action(RequestDescriptor::post(admin_path("users")).json(input).build()).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<ActionResponse, ApiError> {
        self.action(RequestDescriptor::delete(admin_item_path("users", id)).build()).await
    }

    // =========================================================================
    // PUBLIC / NOTIFICATIONS
    // =========================================================================

    /// Aggregate counters shown on the public landing page. No login needed.
    pub async fn public_stats(&self) -> Result<Value, ApiError> {
        self.json(RequestDescriptor::get("/api/public/stats").build()).await
    }

    /// Anonymized recent admissions. No login needed.
    pub async fn recent_patients_public(&self) -> Result<Value, ApiError> {
        self.json(RequestDescriptor::get("/api/notifications/recent-patients-public").build()).await
    }

    /// Recent admissions with patient identifiers; requires a session.
    pub async fn recent_patients(&self) -> Result<Value, ApiError> {
        self.json(RequestDescriptor::get("/api/notifications/recent-patients").build()).await
    }
}
