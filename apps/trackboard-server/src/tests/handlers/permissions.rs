//! Permission handler integration tests.
//!
//! Covers the full management surface: listing, showing, creating, updating
//! and revoking permissions, including the not-found treatment of
//! unauthorized actors and the self-modification guards.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use super::super::common::*;
use crate::server::BoardServer;
use trackboard_storage::{BoardId, Permission, PrincipalRef, Role, Store, UserId};

/// Board with ADMIN=admin (John Smith), EDIT=editor (Dave Lopper), and one
/// unprivileged directory user (Robert Hill) for create/search scenarios.
struct Fixture {
    http: TestServer,
    server: BoardServer,
    board: BoardId,
    admin: UserId,
    editor: UserId,
    bystander: UserId,
    admin_permission: Permission,
    editor_permission: Permission,
}

async fn fixture() -> Fixture {
    let (http, server) = create_test_server().await;
    let board = create_test_board(&server, "My Board").await;

    let admin = create_test_user(&server, "John Smith", "jsmith@somenet.foo").await;
    let editor = create_test_user(&server, "Dave Lopper", "dlopper@somenet.foo").await;
    let bystander = create_test_user(&server, "Robert Hill", "rhill@somenet.foo").await;

    let admin_permission = grant(
        &server,
        &board,
        PrincipalRef::User(admin.clone()),
        Role::Admin,
    )
    .await;
    let editor_permission = grant(
        &server,
        &board,
        PrincipalRef::User(editor.clone()),
        Role::Edit,
    )
    .await;

    Fixture {
        http,
        server,
        board,
        admin,
        editor,
        bystander,
        admin_permission,
        editor_permission,
    }
}

fn assert_not_found_empty(response: &axum_test::TestResponse) {
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.text(), "");
}

// ───────────────────────────────────── index ─────────────────────────────────────

#[tokio::test]
async fn index_as_anonymous_is_not_found_with_empty_body() {
    let f = fixture().await;
    let response = f.http.get(&permissions_path(&f.board)).await;
    assert_not_found_empty(&response);
}

#[tokio::test]
async fn index_as_non_admin_is_not_found_with_empty_body() {
    let f = fixture().await;
    let (name, value) = as_user(&f.editor);
    let response = f
        .http
        .get(&permissions_path(&f.board))
        .add_header(name, value)
        .await;
    assert_not_found_empty(&response);
}

#[tokio::test]
async fn index_as_admin_lists_permissions_in_insertion_order() {
    let f = fixture().await;
    let (name, value) = as_user(&f.admin);
    let response = f
        .http
        .get(&permissions_path(&f.board))
        .add_header(name, value)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], f.admin_permission.id.0.to_string());
    assert_eq!(rows[0]["role"], "ADMIN");
    assert_eq!(rows[1]["id"], f.editor_permission.id.0.to_string());
    assert_eq!(rows[1]["role"], "EDIT");
}

#[tokio::test]
async fn index_on_unknown_board_is_not_found() {
    let f = fixture().await;
    let (name, value) = as_user(&f.admin);
    let response = f
        .http
        .get(&format!(
            "/boards/{}/permissions",
            uuid::Uuid::new_v4()
        ))
        .add_header(name, value)
        .await;
    assert_not_found_empty(&response);
}

#[tokio::test]
async fn index_with_garbage_board_id_is_not_found() {
    let f = fixture().await;
    let (name, value) = as_user(&f.admin);
    let response = f
        .http
        .get("/boards/not-a-uuid/permissions")
        .add_header(name, value)
        .await;
    assert_not_found_empty(&response);
}

// ───────────────────────────────────── show ─────────────────────────────────────

#[tokio::test]
async fn show_as_anonymous_is_not_found_with_empty_body() {
    let f = fixture().await;
    let response = f
        .http
        .get(&permission_path(&f.board, &f.admin_permission))
        .await;
    assert_not_found_empty(&response);
}

#[tokio::test]
async fn show_as_non_admin_is_not_found_with_empty_body() {
    let f = fixture().await;
    let (name, value) = as_user(&f.editor);
    let response = f
        .http
        .get(&permission_path(&f.board, &f.admin_permission))
        .add_header(name, value)
        .await;
    assert_not_found_empty(&response);
}

#[tokio::test]
async fn show_as_admin_returns_resolved_principal() {
    let f = fixture().await;
    let (name, value) = as_user(&f.admin);
    let response = f
        .http
        .get(&permission_path(&f.board, &f.admin_permission))
        .add_header(name, value)
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "id": f.admin_permission.id.0.to_string(),
        "role": "ADMIN",
        "principal": {
            "type": "user",
            "name": "John Smith",
            "id": f.admin.0.to_string(),
            "avatar_url": "https://secure.gravatar.com/avatar/8238a5d4cfa7147f05f31b63a8a320ce?rating=PG&size=128&default="
        }
    }));
}

#[tokio::test]
async fn show_unknown_permission_is_not_found() {
    let f = fixture().await;
    let (name, value) = as_user(&f.admin);
    let response = f
        .http
        .get(&format!(
            "/boards/{}/permissions/{}",
            f.board.0,
            uuid::Uuid::new_v4()
        ))
        .add_header(name, value)
        .await;
    assert_not_found_empty(&response);
}

#[tokio::test]
async fn show_group_permission_has_null_avatar() {
    let f = fixture().await;
    let group = create_test_group(&f.server, "A Team").await;
    let permission = grant(&f.server, &f.board, PrincipalRef::Group(group), Role::Read).await;

    let (name, value) = as_user(&f.admin);
    let response = f
        .http
        .get(&permission_path(&f.board, &permission))
        .add_header(name, value)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["principal"]["type"], "group");
    assert_eq!(body["principal"]["name"], "A Team");
    assert_eq!(body["principal"]["avatar_url"], Value::Null);
}

// ──────────────────────────────────── create ────────────────────────────────────

#[tokio::test]
async fn create_as_anonymous_is_not_found() {
    let f = fixture().await;
    let response = f
        .http
        .post(&permissions_path(&f.board))
        .json(&json!({
            "principal": {"type": "user", "id": f.bystander.0.to_string()},
            "role": "READ"
        }))
        .await;
    assert_not_found_empty(&response);
}

#[tokio::test]
async fn create_as_non_admin_is_not_found() {
    let f = fixture().await;
    let (name, value) = as_user(&f.editor);
    let response = f
        .http
        .post(&permissions_path(&f.board))
        .add_header(name, value)
        .json(&json!({
            "principal": {"type": "user", "id": f.bystander.0.to_string()},
            "role": "READ"
        }))
        .await;
    assert_not_found_empty(&response);
}

#[tokio::test]
async fn create_as_admin_grants_permission() {
    let f = fixture().await;
    let (name, value) = as_user(&f.admin);
    let response = f
        .http
        .post(&permissions_path(&f.board))
        .add_header(name, value)
        .json(&json!({
            "principal": {"type": "user", "id": f.bystander.0.to_string()},
            "role": "READ"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["role"], "READ");
    assert_eq!(body["principal"]["id"], f.bystander.0.to_string());

    // Count went from 2 to 3 and the stored record matches the response.
    let listed = f.server.store.list_permissions(&f.board).await.unwrap();
    assert_eq!(listed.len(), 3);
    let stored = &listed[2];
    assert_eq!(stored.id.0.to_string(), body["id"]);
    assert_eq!(stored.principal, PrincipalRef::User(f.bystander.clone()));
    assert_eq!(stored.role, Role::Read);
}

#[tokio::test]
async fn create_accepts_lowercase_role_and_stores_canonical_form() {
    let f = fixture().await;
    let (name, value) = as_user(&f.admin);
    let response = f
        .http
        .post(&permissions_path(&f.board))
        .add_header(name, value)
        .json(&json!({
            "principal": {"type": "user", "id": f.bystander.0.to_string()},
            "role": "read"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["role"], "READ");
}

#[tokio::test]
async fn create_for_group_principal() {
    let f = fixture().await;
    let group = create_test_group(&f.server, "A Team").await;

    let (name, value) = as_user(&f.admin);
    let response = f
        .http
        .post(&permissions_path(&f.board))
        .add_header(name, value)
        .json(&json!({
            "principal": {"type": "group", "id": group.0.to_string()},
            "role": "EDIT"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["principal"]["type"], "group");
    assert_eq!(body["role"], "EDIT");
}

#[tokio::test]
async fn create_duplicate_fails_with_already_taken() {
    let f = fixture().await;
    let (name, value) = as_user(&f.admin);
    // The editor already holds EDIT; the requested role makes no difference.
    let response = f
        .http
        .post(&permissions_path(&f.board))
        .add_header(name, value)
        .json(&json!({
            "principal": {"type": "user", "id": f.editor.0.to_string()},
            "role": "READ"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    response.assert_json(&json!({"errors": {"principal_id": ["already_taken"]}}));

    let listed = f.server.store.list_permissions(&f.board).await.unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn create_with_unsupported_principal_type_fails_with_required() {
    let f = fixture().await;
    let (name, value) = as_user(&f.admin);
    let response = f
        .http
        .post(&permissions_path(&f.board))
        .add_header(name, value)
        .json(&json!({
            "principal": {"type": "project", "id": "57664"},
            "role": "READ"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    response.assert_json(&json!({"errors": {"principal_id": ["required"]}}));
}

#[tokio::test]
async fn create_with_unresolvable_user_fails_with_required() {
    let f = fixture().await;
    let (name, value) = as_user(&f.admin);
    let response = f
        .http
        .post(&permissions_path(&f.board))
        .add_header(name, value)
        .json(&json!({
            "principal": {"type": "user", "id": uuid::Uuid::new_v4().to_string()},
            "role": "READ"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    response.assert_json(&json!({"errors": {"principal_id": ["required"]}}));
}

#[tokio::test]
async fn create_with_missing_principal_fails_with_required() {
    let f = fixture().await;
    let (name, value) = as_user(&f.admin);
    let response = f
        .http
        .post(&permissions_path(&f.board))
        .add_header(name, value)
        .json(&json!({"role": "READ"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    response.assert_json(&json!({"errors": {"principal_id": ["required"]}}));
}

#[tokio::test]
async fn create_with_invalid_role_fails_with_invalid_role() {
    let f = fixture().await;
    let (name, value) = as_user(&f.admin);
    let response = f
        .http
        .post(&permissions_path(&f.board))
        .add_header(name, value)
        .json(&json!({
            "principal": {"type": "user", "id": f.bystander.0.to_string()},
            "role": "MASTER_OF_DESASTER"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    response.assert_json(&json!({"errors": {"role": ["invalid_role"]}}));
}

// ──────────────────────────────────── update ────────────────────────────────────

#[tokio::test]
async fn update_as_anonymous_is_not_found() {
    let f = fixture().await;
    let response = f
        .http
        .patch(&permission_path(&f.board, &f.editor_permission))
        .json(&json!({"role": "read"}))
        .await;
    assert_not_found_empty(&response);
}

#[tokio::test]
async fn update_as_non_admin_is_not_found() {
    let f = fixture().await;
    let (name, value) = as_user(&f.editor);
    let response = f
        .http
        .patch(&permission_path(&f.board, &f.editor_permission))
        .add_header(name, value)
        .json(&json!({"role": "read"}))
        .await;
    assert_not_found_empty(&response);
}

#[tokio::test]
async fn update_with_invalid_role_fails_with_invalid_role() {
    let f = fixture().await;
    let (name, value) = as_user(&f.admin);
    let response = f
        .http
        .patch(&permission_path(&f.board, &f.editor_permission))
        .add_header(name, value)
        .json(&json!({"role": "MASTER_OF_DESASTER"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    response.assert_json(&json!({"errors": {"role": ["invalid_role"]}}));

    // Nothing was written.
    let stored = f
        .server
        .store
        .get_permission(&f.board, &f.editor_permission.id)
        .await
        .unwrap();
    assert_eq!(stored.role, Role::Edit);
}

#[tokio::test]
async fn update_with_valid_role_changes_it() {
    let f = fixture().await;
    let (name, value) = as_user(&f.admin);
    let response = f
        .http
        .patch(&permission_path(&f.board, &f.editor_permission))
        .add_header(name, value)
        .json(&json!({"role": "read"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["role"], "READ");

    let stored = f
        .server
        .store
        .get_permission(&f.board, &f.editor_permission.id)
        .await
        .unwrap();
    assert_eq!(stored.role, Role::Read);
}

#[tokio::test]
async fn update_own_permission_is_rejected() {
    let f = fixture().await;
    let (name, value) = as_user(&f.admin);
    let response = f
        .http
        .patch(&permission_path(&f.board, &f.admin_permission))
        .add_header(name, value)
        .json(&json!({"role": "read"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    response.assert_json(&json!({"errors": ["cannot_edit_own_permission"]}));

    // The admin keeps their role.
    let stored = f
        .server
        .store
        .get_permission(&f.board, &f.admin_permission.id)
        .await
        .unwrap();
    assert_eq!(stored.role, Role::Admin);
}

#[tokio::test]
async fn update_unknown_permission_is_not_found() {
    let f = fixture().await;
    let (name, value) = as_user(&f.admin);
    let response = f
        .http
        .patch(&format!(
            "/boards/{}/permissions/{}",
            f.board.0,
            uuid::Uuid::new_v4()
        ))
        .add_header(name, value)
        .json(&json!({"role": "read"}))
        .await;
    assert_not_found_empty(&response);
}

// ─────────────────────────────────── destroy ────────────────────────────────────

#[tokio::test]
async fn destroy_as_anonymous_is_not_found() {
    let f = fixture().await;
    let response = f
        .http
        .delete(&permission_path(&f.board, &f.editor_permission))
        .await;
    assert_not_found_empty(&response);
}

#[tokio::test]
async fn destroy_as_non_admin_is_not_found() {
    let f = fixture().await;
    let (name, value) = as_user(&f.editor);
    let response = f
        .http
        .delete(&permission_path(&f.board, &f.editor_permission))
        .add_header(name, value)
        .await;
    assert_not_found_empty(&response);
}

#[tokio::test]
async fn destroy_as_admin_revokes_permission() {
    let f = fixture().await;
    let (name, value) = as_user(&f.admin);
    let response = f
        .http
        .delete(&permission_path(&f.board, &f.editor_permission))
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    assert_eq!(response.text(), "");

    let listed = f.server.store.list_permissions(&f.board).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, f.admin_permission.id);
}

#[tokio::test]
async fn destroy_own_permission_is_rejected() {
    let f = fixture().await;
    let (name, value) = as_user(&f.admin);
    let response = f
        .http
        .delete(&permission_path(&f.board, &f.admin_permission))
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    response.assert_json(&json!({"errors": ["cannot_delete_own_permission"]}));

    let listed = f.server.store.list_permissions(&f.board).await.unwrap();
    assert_eq!(listed.len(), 2);
}

// ───────────────────────────── group-held admin access ───────────────────────────

#[tokio::test]
async fn group_held_admin_can_manage_permissions() {
    let f = fixture().await;
    let group = create_test_group(&f.server, "Board Owners").await;
    let member = create_test_user(&f.server, "Some One", "someone@foo.bar").await;
    f.server
        .store
        .add_group_member(&group, &member)
        .await
        .unwrap();
    grant(&f.server, &f.board, PrincipalRef::Group(group), Role::Admin).await;

    let (name, value) = as_user(&member);
    let response = f
        .http
        .get(&permissions_path(&f.board))
        .add_header(name.clone(), value.clone())
        .await;
    response.assert_status_ok();

    // The member acts through the group, so the editor's record is not
    // "their own" and can be revoked.
    let response = f
        .http
        .delete(&permission_path(&f.board, &f.editor_permission))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
}

// ───────────────────────────────────── health ────────────────────────────────────

#[tokio::test]
async fn healthz_needs_no_actor() {
    let f = fixture().await;
    let response = f.http.get("/healthz").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "ok");
}
