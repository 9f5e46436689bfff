//! Typed payloads for the admin REST API.
//!
//! DESIGN
//! ======
//! Inputs and the auth/mutation envelopes are typed because the client relies
//! on their fields (`success`, `token`, `message`). List and record payloads
//! stay `serde_json::Value`: their shape is owned by the backend.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// AUTH
// =============================================================================

/// Login request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Administrator account as returned by login and `/auth/user`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// ISO-8601 timestamp of the previous login, if any.
    #[serde(default)]
    pub last_login: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<AdminUser>,
}

impl LoginResponse {
    /// Token to persist: present only when the backend reported success and
    /// actually issued a non-empty token.
    #[must_use]
    pub fn issued_token(&self) -> Option<&str> {
        if !self.success {
            return None;
        }
        self.token.as_deref().filter(|token| !token.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CurrentUserResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user: Option<AdminUser>,
}

// =============================================================================
// MUTATIONS
// =============================================================================

/// Envelope returned by create/update/delete/restore calls. Resource-specific
/// fields (`department`, `backup`, ...) are kept in `extra`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentInput {
    pub name: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInput {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    pub department_id: i64,
}

/// Patient case. `hn` is the hospital number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseInput {
    pub hn: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// ISO-8601 date or datetime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_date: Option<String>,
    pub department_id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

// =============================================================================
// FILTERS
// =============================================================================

/// Query filters for the contact list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactFilter {
    pub search: Option<String>,
    pub department_id: Option<i64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ContactFilter {
    /// Present fields only, in declaration order.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        push_param(&mut out, "search", self.search.as_ref());
        push_param(&mut out, "department_id", self.department_id.as_ref());
        push_param(&mut out, "page", self.page.as_ref());
        push_param(&mut out, "per_page", self.per_page.as_ref());
        out
    }
}

/// Query filters for the patient case list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaseFilter {
    pub search: Option<String>,
    pub department_id: Option<i64>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl CaseFilter {
    /// Present fields only, in declaration order.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        push_param(&mut out, "search", self.search.as_ref());
        push_param(&mut out, "department_id", self.department_id.as_ref());
        push_param(&mut out, "status", self.status.as_ref());
        push_param(&mut out, "page", self.page.as_ref());
        push_param(&mut out, "per_page", self.per_page.as_ref());
        out
    }
}

fn push_param<T: ToString>(out: &mut Vec<(String, String)>, key: &str, value: Option<&T>) {
    if let Some(value) = value {
        out.push((key.to_owned(), value.to_string()));
    }
}
