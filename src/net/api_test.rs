use super::*;
use crate::net::request::Method;
use crate::state::session::{Credential, MemoryStorage, SessionError, Tier};
use crate::test_helpers::{BASE_URL, MockTransport, RejectingStorage, test_api};
use serde_json::json;

fn url(path: &str) -> String {
    format!("{BASE_URL}{path}")
}

// =============================================================================
// login
// =============================================================================

#[tokio::test]
async fn login_success_with_remember_stores_durable_token() {
    let transport = MockTransport::new();
    transport.push_json(200, &json!({ "success": true, "token": "xyz" }));
    let api = test_api(&transport);

    let resp = api.login("a", "b", Some(true)).await.unwrap();

    assert!(resp.success);
    assert_eq!(
        api.session().read(),
        Some(Credential { token: "xyz".to_owned(), tier: Tier::Durable })
    );
    let req = transport.last_request();
    assert_eq!(req.method, Method::Post);
    assert_eq!(req.url, url("/api/admin/auth/login"));
    let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({ "username": "a", "password": "b" }));
}

#[tokio::test]
async fn login_without_remember_uses_ephemeral_tier_by_default() {
    let transport = MockTransport::new();
    transport.push_json(200, &json!({ "success": true, "token": "xyz" }));
    let api = test_api(&transport);

    api.login("a", "b", None).await.unwrap();

    assert_eq!(api.session().read().map(|c| c.tier), Some(Tier::Ephemeral));
}

#[tokio::test]
async fn login_honors_configured_remember_default() {
    let transport = MockTransport::new();
    transport.push_json(200, &json!({ "success": true, "token": "xyz" }));
    let mut config = crate::test_helpers::test_config();
    config.remember_by_default = true;
    let api = AdminApi::new(&config, SessionStore::in_memory(&config.token_key), transport.clone());

    api.login("a", "b", None).await.unwrap();

    assert_eq!(api.session().read().map(|c| c.tier), Some(Tier::Durable));
}

#[tokio::test]
async fn login_success_replaces_stale_durable_token() {
    let transport = MockTransport::new();
    transport.push_json(200, &json!({ "success": true, "token": "fresh" }));
    let api = test_api(&transport);
    api.session().write("stale", true).unwrap();

    api.login("a", "b", Some(false)).await.unwrap();

    assert_eq!(
        api.session().read(),
        Some(Credential { token: "fresh".to_owned(), tier: Tier::Ephemeral })
    );
}

#[tokio::test]
async fn login_reported_failure_leaves_session_unchanged() {
    let transport = MockTransport::new();
    transport.push_json(200, &json!({ "success": false }));
    let api = test_api(&transport);
    api.session().write("prior", false).unwrap();

    let resp = api.login("a", "b", Some(true)).await.unwrap();

    assert!(!resp.success);
    assert_eq!(api.session().token().as_deref(), Some("prior"));
}

#[tokio::test]
async fn login_rejected_by_backend_leaves_session_unchanged() {
    let transport = MockTransport::new();
    transport.push_json(401, &json!({ "success": false, "message": "bad credentials" }));
    let api = test_api(&transport);

    let err = api.login("a", "wrong", Some(true)).await.unwrap_err();

    assert_eq!(err, ApiError::Request(RequestError { status: 401, message: "bad credentials".to_owned() }));
    assert_eq!(api.session().read(), None);
}

#[tokio::test]
async fn login_with_rejected_storage_keeps_previous_credential() {
    let transport = MockTransport::new();
    transport.push_json(200, &json!({ "success": true, "token": "fresh" }));
    let config = crate::test_helpers::test_config();
    let ephemeral = Rc::new(MemoryStorage::new());
    let session = SessionStore::new(&config.token_key, Rc::new(RejectingStorage(Tier::Durable)), ephemeral);
    session.write("prior", false).unwrap();
    let api = AdminApi::new(&config, session, transport.clone());

    let err = api.login("a", "b", Some(true)).await.unwrap_err();

    assert_eq!(err, ApiError::Session(SessionError::WriteRejected(Tier::Durable)));
    assert_eq!(api.session().token().as_deref(), Some("prior"));
}

#[tokio::test]
async fn login_success_without_token_does_not_write() {
    let transport = MockTransport::new();
    transport.push_json(200, &json!({ "success": true, "message": "cookie session" }));
    let api = test_api(&transport);

    api.login("a", "b", Some(true)).await.unwrap();

    assert_eq!(api.session().read(), None);
}

#[tokio::test]
async fn login_network_failure_does_not_write() {
    let transport = MockTransport::new();
    transport.push_failure("dns lookup failed");
    let api = test_api(&transport);

    let err = api.login("a", "b", Some(true)).await.unwrap_err();

    assert_eq!(err.status(), Some(-1));
    assert_eq!(api.session().read(), None);
}

#[tokio::test]
async fn aborted_login_never_writes_session() {
    let transport = MockTransport::new();
    transport.push_json(200, &json!({ "success": true, "token": "xyz" }));
    let api = test_api(&transport);
    let (handle, registration) = futures::future::AbortHandle::new_pair();
    handle.abort();

    let out = crate::net::dispatcher::cancellable(api.login("a", "b", Some(true)), registration).await;

    assert_eq!(out, Err(ApiError::Aborted));
    assert_eq!(api.session().read(), None);
}

// =============================================================================
// logout
// =============================================================================

#[tokio::test]
async fn logout_clears_session_after_success() {
    let transport = MockTransport::new();
    transport.push_json(200, &json!({ "success": true }));
    let api = test_api(&transport);
    api.session().write("t", true).unwrap();

    api.logout().await;

    assert_eq!(api.session().read(), None);
    let req = transport.last_request();
    assert_eq!(req.url, url("/api/admin/auth/logout"));
    assert_eq!(req.header("authorization"), Some("Bearer t"));
}

#[tokio::test]
async fn logout_clears_session_even_when_backend_fails() {
    let transport = MockTransport::new();
    transport.push_json(500, &json!({ "success": false, "message": "boom" }));
    let api = test_api(&transport);
    api.session().write("a", true).unwrap();
    api.session().write("b", false).unwrap();

    api.logout().await;

    assert_eq!(api.session().read(), None);
}

#[tokio::test]
async fn logout_clears_session_on_network_failure() {
    let transport = MockTransport::new();
    transport.push_failure("connection reset");
    let api = test_api(&transport);
    api.session().write("t", false).unwrap();

    api.logout().await;

    assert_eq!(api.session().read(), None);
}

// =============================================================================
// current user
// =============================================================================

#[tokio::test]
async fn current_user_decodes_account() {
    let transport = MockTransport::new();
    transport.push_json(
        200,
        &json!({ "success": true, "user": { "id": 4, "username": "nurse", "role": "staff" } }),
    );
    let api = test_api(&transport);

    let resp = api.current_user().await.unwrap();

    assert_eq!(resp.user.map(|u| u.id), Some(4));
    assert_eq!(transport.last_request().url, url("/api/admin/auth/user"));
}

#[tokio::test]
async fn current_user_shape_mismatch_is_invalid_body() {
    let transport = MockTransport::new();
    transport.push_json(200, &json!({ "success": true, "user": { "id": "not-a-number" } }));
    let api = test_api(&transport);

    let err = api.current_user().await.unwrap_err();

    assert_eq!(err.status(), Some(0));
}

#[tokio::test]
async fn expired_session_surfaces_as_session_invalid() {
    let transport = MockTransport::new();
    transport.push_json(401, &json!({ "message": "Token has expired" }));
    let api = test_api(&transport);
    api.session().write("old", true).unwrap();

    let err = api.departments().await.unwrap_err();

    assert!(err.is_session_invalid());
    // The facade does not clear the session on its own.
    assert!(api.auth_gate().is_authenticated());
}

// =============================================================================
// catalog routing
// =============================================================================

#[tokio::test]
async fn read_operations_hit_expected_paths() {
    let transport = MockTransport::new();
    let api = test_api(&transport);

    api.dashboard_stats().await.unwrap();
    api.dashboard_activities().await.unwrap();
    api.departments().await.unwrap();
    api.department(3).await.unwrap();
    api.contacts(&ContactFilter::default()).await.unwrap();
    api.contact(5).await.unwrap();
    api.cases(&CaseFilter::default()).await.unwrap();
    api.case(8).await.unwrap();
    api.backups().await.unwrap();
    api.activities().await.unwrap();
    api.knowledge().await.unwrap();
    api.guidelines().await.unwrap();
    api.users().await.unwrap();
    api.public_stats().await.unwrap();
    api.recent_patients_public().await.unwrap();
    api.recent_patients().await.unwrap();

    let seen: Vec<(Method, String)> = transport.requests().into_iter().map(|r| (r.method, r.url)).collect();
    let expected: Vec<(Method, String)> = [
        "/api/admin/dashboard/stats",
        "/api/admin/dashboard/activities",
        "/api/admin/departments",
        "/api/admin/departments/3",
        "/api/admin/contacts",
        "/api/admin/contacts/5",
        "/api/admin/cases",
        "/api/admin/cases/8",
        "/api/admin/backups",
        "/api/admin/activities",
        "/api/admin/knowledge",
        "/api/admin/guidelines",
        "/api/admin/users",
        "/api/public/stats",
        "/api/notifications/recent-patients-public",
        "/api/notifications/recent-patients",
    ]
    .into_iter()
    .map(|p| (Method::Get, url(p)))
    .collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn mutations_use_expected_methods_and_paths() {
    let transport = MockTransport::new();
    let api = test_api(&transport);
    let dept = DepartmentInput { name: "ER".into(), code: "ER".into(), description: None };
    let contact = ContactInput {
        first_name: "Anan".into(),
        last_name: "Sukjai".into(),
        email: None,
        phone: Some("0812345678".into()),
        position: None,
        department_id: 1,
    };
    let case = CaseInput {
        hn: "HN9".into(),
        first_name: "Mali".into(),
        last_name: "Dee".into(),
        age: None,
        gender: None,
        diagnosis: None,
        treatment: None,
        status: None,
        case_date: None,
        department_id: 1,
    };
    let user = UserInput { username: "staff".into(), password: "pw".into(), email: None, role: None };

    api.create_department(&dept).await.unwrap();
    api.update_department(2, &dept).await.unwrap();
    api.delete_department(2).await.unwrap();
    api.create_contact(&contact).await.unwrap();
    api.update_contact(4, &contact).await.unwrap();
    api.delete_contact(4).await.unwrap();
    api.create_case(&case).await.unwrap();
    api.update_case(6, &case).await.unwrap();
    api.delete_case(6).await.unwrap();
    api.create_backup().await.unwrap();
    api.restore_backup("backup_1.db").await.unwrap();
    api.delete_backup("backup_1.db").await.unwrap();
    api.delete_activity(10).await.unwrap();
    api.delete_knowledge(11).await.unwrap();
    api.delete_guideline(12).await.unwrap();
    api.create_user(&user).await.unwrap();
    api.delete_user(13).await.unwrap();

    let seen: Vec<(Method, String)> = transport.requests().into_iter().map(|r| (r.method, r.url)).collect();
    let expected: Vec<(Method, String)> = [
        (Method::Post, "/api/admin/departments"),
        (Method::Put, "/api/admin/departments/2"),
        (Method::Delete, "/api/admin/departments/2"),
        (Method::Post, "/api/admin/contacts"),
        (Method::Put, "/api/admin/contacts/4"),
        (Method::Delete, "/api/admin/contacts/4"),
        (Method::Post, "/api/admin/cases"),
        (Method::Put, "/api/admin/cases/6"),
        (Method::Delete, "/api/admin/cases/6"),
        (Method::Post, "/api/admin/backups/create"),
        (Method::Post, "/api/admin/backups/backup_1.db/restore"),
        (Method::Delete, "/api/admin/backups/backup_1.db"),
        (Method::Delete, "/api/admin/activities/10"),
        (Method::Delete, "/api/admin/knowledge/11"),
        (Method::Delete, "/api/admin/guidelines/12"),
        (Method::Post, "/api/admin/users"),
        (Method::Delete, "/api/admin/users/13"),
    ]
    .into_iter()
    .map(|(m, p)| (m, url(p)))
    .collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn create_sends_typed_body() {
    let transport = MockTransport::new();
    let api = test_api(&transport);
    let dept = DepartmentInput { name: "Cardiology".into(), code: "CAR".into(), description: Some("Heart".into()) };

    api.create_department(&dept).await.unwrap();

    let body: Value = serde_json::from_str(transport.last_request().body.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({ "name": "Cardiology", "code": "CAR", "description": "Heart" }));
}

#[tokio::test]
async fn list_filters_become_ordered_query() {
    let transport = MockTransport::new();
    let api = test_api(&transport);
    let filter = CaseFilter { status: Some("open".into()), search: Some("a b".into()), ..CaseFilter::default() };

    api.cases(&filter).await.unwrap();

    assert_eq!(transport.last_request().url, url("/api/admin/cases?search=a%20b&status=open"));
}

#[tokio::test]
async fn mutation_envelope_is_returned_even_when_not_successful() {
    let transport = MockTransport::new();
    transport.push_json(200, &json!({ "success": false, "message": "code exists" }));
    let api = test_api(&transport);
    let dept = DepartmentInput { name: "ER".into(), code: "ER".into(), description: None };

    let resp = api.create_department(&dept).await.unwrap();

    assert!(!resp.success);
    assert_eq!(resp.message.as_deref(), Some("code exists"));
}

// =============================================================================
// backups
// =============================================================================

#[tokio::test]
async fn backup_filenames_are_path_encoded() {
    let transport = MockTransport::new();
    let api = test_api(&transport);

    api.restore_backup("hospital backup.db").await.unwrap();

    assert_eq!(
        transport.last_request().url,
        url("/api/admin/backups/hospital%20backup.db/restore")
    );
}

#[tokio::test]
async fn blank_backup_filename_is_never_sent() {
    let transport = MockTransport::new();
    let api = test_api(&transport);

    let err = api.delete_backup(" ").await.unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn dot_backup_filenames_are_never_sent() {
    let transport = MockTransport::new();
    let api = test_api(&transport);

    let restore = api.restore_backup("..").await.unwrap_err();
    let delete = api.delete_backup(".").await.unwrap_err();
    let download = api.download_backup("..").await.unwrap_err();

    for err in [restore, delete, download] {
        assert_eq!(err, ApiError::Validation(ValidationError::DotSegment("filename")));
    }
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn download_backup_returns_bytes() {
    let transport = MockTransport::new();
    transport.push_raw(200, b"SQLite format 3\0");
    let api = test_api(&transport);

    let bytes = api.download_backup("backup_1.db").await.unwrap();

    assert_eq!(bytes, b"SQLite format 3\0".to_vec());
    assert_eq!(transport.last_request().url, url("/api/admin/backups/backup_1.db/download"));
}

#[tokio::test]
async fn download_backup_failure_uses_backend_message() {
    let transport = MockTransport::new();
    transport.push_json(404, &json!({ "success": false, "message": "backup not found" }));
    let api = test_api(&transport);

    let err = api.download_backup("gone.db").await.unwrap_err();

    assert_eq!(err, ApiError::Request(RequestError { status: 404, message: "backup not found".to_owned() }));
}

// =============================================================================
// credentials
// =============================================================================

#[tokio::test]
async fn every_call_carries_bearer_once_logged_in() {
    let transport = MockTransport::new();
    transport.push_json(200, &json!({ "success": true, "token": "tok" }));
    let api = test_api(&transport);

    api.login("a", "b", Some(false)).await.unwrap();
    api.users().await.unwrap();
    api.public_stats().await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].header("authorization"), None);
    assert_eq!(requests[1].header("authorization"), Some("Bearer tok"));
    assert_eq!(requests[2].header("authorization"), Some("Bearer tok"));
}
