//! Board permission handlers: index, show, search, create, update, destroy.

use std::collections::HashSet;
use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use trackboard_storage::{
    BoardId, GrantPermissionParams, GroupId, Permission, PermissionId, PrincipalRef, Role, Store,
    StoreError, UserId,
};

use crate::avatar;
use crate::error::{internal, ApiError};
use crate::server::{extract_actor, BoardServer};

// ───────────────────────────────────── Request bodies ─────────────────────────────────────

#[derive(Deserialize)]
pub struct PrincipalParam {
    #[serde(rename = "type")]
    kind: Option<String>,
    /// Accepts a string or a number; anything that doesn't resolve counts
    /// as missing.
    id: Option<Value>,
}

#[derive(Deserialize)]
pub struct CreateBody {
    principal: Option<PrincipalParam>,
    role: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateBody {
    role: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: Option<String>,
}

// ─────────────────────────────────────── Helpers ──────────────────────────────────────────

/// Garbage path ids get the same not-found treatment as unknown resources.
fn parse_board_id(raw: &str) -> Result<BoardId, ApiError> {
    Uuid::try_parse(raw)
        .map(BoardId)
        .map_err(|_| ApiError::NotAuthorized)
}

fn parse_permission_id(raw: &str) -> Result<PermissionId, ApiError> {
    Uuid::try_parse(raw)
        .map(PermissionId)
        .map_err(|_| ApiError::NotAuthorized)
}

fn parse_role(raw: Option<&str>) -> Result<Role, ApiError> {
    raw.and_then(|s| Role::from_str(s).ok())
        .ok_or_else(|| ApiError::validation("role", "invalid_role"))
}

/// Resolve a `{type, id}` reference against the user/group directories.
///
/// Unknown types, malformed ids and ids that don't resolve are all reported
/// as a missing principal, matching how the validation layer treats them.
async fn resolve_principal(
    server: &BoardServer,
    param: Option<&PrincipalParam>,
) -> Result<PrincipalRef, ApiError> {
    let required = || ApiError::validation("principal_id", "required");

    let param = param.ok_or_else(required)?;
    let kind = param.kind.as_deref().ok_or_else(required)?;
    let raw_id = match &param.id {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(required()),
    };
    let id = Uuid::try_parse(&raw_id).map_err(|_| required())?;

    match kind {
        "user" => match server.store.get_user(&UserId(id)).await {
            Ok(user) => Ok(PrincipalRef::User(user.id)),
            Err(StoreError::NotFound) => Err(required()),
            Err(e) => Err(internal(e)),
        },
        "group" => match server.store.get_group(&GroupId(id)).await {
            Ok(group) => Ok(PrincipalRef::Group(group.id)),
            Err(StoreError::NotFound) => Err(required()),
            Err(e) => Err(internal(e)),
        },
        _ => Err(required()),
    }
}

/// Render a permission with its principal resolved for display.
async fn permission_json(server: &BoardServer, permission: &Permission) -> Result<Value, ApiError> {
    let principal = match &permission.principal {
        PrincipalRef::User(id) => match server.store.get_user(id).await {
            Ok(user) => json!({
                "type": "user",
                "name": user.name,
                "id": user.id.0.to_string(),
                "avatar_url": avatar::gravatar_url(&user.email),
            }),
            // The user may have been deleted from the directory since.
            Err(StoreError::NotFound) => json!({
                "type": "user",
                "name": "",
                "id": id.0.to_string(),
                "avatar_url": Value::Null,
            }),
            Err(e) => return Err(internal(e)),
        },
        PrincipalRef::Group(id) => match server.store.get_group(id).await {
            Ok(group) => json!({
                "type": "group",
                "name": group.name,
                "id": group.id.0.to_string(),
                "avatar_url": Value::Null,
            }),
            Err(StoreError::NotFound) => json!({
                "type": "group",
                "name": "",
                "id": id.0.to_string(),
                "avatar_url": Value::Null,
            }),
            Err(e) => return Err(internal(e)),
        },
    };

    Ok(json!({
        "id": permission.id.0.to_string(),
        "role": permission.role.as_str(),
        "principal": principal,
    }))
}

// ─────────────────────────────────────── Handlers ─────────────────────────────────────────

pub async fn index(
    State(server): State<BoardServer>,
    Path(board_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let board_id = parse_board_id(&board_id)?;
    let actor = extract_actor(&headers);
    server.require_board_admin(actor.as_ref(), &board_id).await?;

    let permissions = server
        .store
        .list_permissions(&board_id)
        .await
        .map_err(internal)?;

    let mut out = Vec::with_capacity(permissions.len());
    for permission in &permissions {
        out.push(permission_json(&server, permission).await?);
    }
    Ok(Json(Value::Array(out)).into_response())
}

pub async fn show(
    State(server): State<BoardServer>,
    Path((board_id, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let board_id = parse_board_id(&board_id)?;
    let permission_id = parse_permission_id(&id)?;
    let actor = extract_actor(&headers);
    server.require_board_admin(actor.as_ref(), &board_id).await?;

    let permission = server
        .store
        .get_permission(&board_id, &permission_id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::NotAuthorized,
            e => internal(e),
        })?;

    Ok(Json(permission_json(&server, &permission).await?).into_response())
}

pub async fn search(
    State(server): State<BoardServer>,
    Path(board_id): Path<String>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    let board_id = parse_board_id(&board_id)?;
    let actor = extract_actor(&headers);
    server.require_board_admin(actor.as_ref(), &board_id).await?;

    // Principals already holding a permission are not candidates.
    let taken: HashSet<(&'static str, Uuid)> = server
        .store
        .list_permissions(&board_id)
        .await
        .map_err(internal)?
        .iter()
        .map(|p| (p.principal.kind(), p.principal.uuid()))
        .collect();

    let needle = query.q.unwrap_or_default().to_lowercase();
    let matches = |name: &str| needle.is_empty() || name.to_lowercase().contains(&needle);

    let mut out = Vec::new();
    for user in server.store.list_users().await.map_err(internal)? {
        if taken.contains(&("user", user.id.0)) || !matches(&user.name) {
            continue;
        }
        out.push(json!({
            "type": "user",
            "id": user.id.0.to_string(),
            "name": user.name,
            "avatar_url": avatar::gravatar_url(&user.email),
        }));
    }
    for group in server.store.list_groups().await.map_err(internal)? {
        if taken.contains(&("group", group.id.0)) || !matches(&group.name) {
            continue;
        }
        out.push(json!({
            "type": "group",
            "id": group.id.0.to_string(),
            "name": group.name,
            "avatar_url": Value::Null,
        }));
    }

    Ok(Json(Value::Array(out)).into_response())
}

pub async fn create(
    State(server): State<BoardServer>,
    Path(board_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<CreateBody>,
) -> Result<Response, ApiError> {
    let board_id = parse_board_id(&board_id)?;
    let actor = extract_actor(&headers);
    server.require_board_admin(actor.as_ref(), &board_id).await?;

    let principal = resolve_principal(&server, body.principal.as_ref()).await?;
    let role = parse_role(body.role.as_deref())?;

    let permission = server
        .store
        .grant_permission(&GrantPermissionParams {
            board_id,
            principal,
            role,
        })
        .await
        .map_err(|e| match e {
            StoreError::AlreadyExists => ApiError::validation("principal_id", "already_taken"),
            e => internal(e),
        })?;

    tracing::info!(
        permission = %permission.id.0,
        role = permission.role.as_str(),
        "permission granted"
    );
    Ok(Json(permission_json(&server, &permission).await?).into_response())
}

pub async fn update(
    State(server): State<BoardServer>,
    Path((board_id, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<UpdateBody>,
) -> Result<Response, ApiError> {
    let board_id = parse_board_id(&board_id)?;
    let permission_id = parse_permission_id(&id)?;
    let actor = extract_actor(&headers);
    let actor = server.require_board_admin(actor.as_ref(), &board_id).await?;

    let permission = server
        .store
        .get_permission(&board_id, &permission_id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::NotAuthorized,
            e => internal(e),
        })?;

    let role = parse_role(body.role.as_deref())?;

    // Self-guard: admins cannot change their own role.
    if permission.principal == PrincipalRef::User(actor) {
        return Err(ApiError::Rule("cannot_edit_own_permission"));
    }

    let updated = server
        .store
        .update_permission_role(&permission.id, role)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::NotAuthorized,
            e => internal(e),
        })?;

    tracing::info!(
        permission = %updated.id.0,
        role = updated.role.as_str(),
        "permission role changed"
    );
    Ok(Json(permission_json(&server, &updated).await?).into_response())
}

pub async fn destroy(
    State(server): State<BoardServer>,
    Path((board_id, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let board_id = parse_board_id(&board_id)?;
    let permission_id = parse_permission_id(&id)?;
    let actor = extract_actor(&headers);
    let actor = server.require_board_admin(actor.as_ref(), &board_id).await?;

    let permission = server
        .store
        .get_permission(&board_id, &permission_id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::NotAuthorized,
            e => internal(e),
        })?;

    // Self-guard: admins cannot revoke their own access.
    if permission.principal == PrincipalRef::User(actor) {
        return Err(ApiError::Rule("cannot_delete_own_permission"));
    }

    server
        .store
        .revoke_permission(&permission.id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::NotAuthorized,
            e => internal(e),
        })?;

    tracing::info!(permission = %permission.id.0, "permission revoked");
    Ok(StatusCode::NO_CONTENT.into_response())
}
