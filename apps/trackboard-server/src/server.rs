//! Server state, actor extraction and the board authorization gate.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::routing::get;
use axum::Router;
use uuid::Uuid;

use trackboard_storage::{BoardId, PrincipalRef, Role, Store, StoreError, UserId};

use crate::error::{internal, ApiError};
use crate::handlers::permissions;

/// Header carrying the host-authenticated actor. The host application owns
/// login; this service only trusts what it forwards.
pub const ACTOR_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct BoardServer {
    pub store: Arc<dyn Store>,
}

impl BoardServer {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Admit only board administrators; everyone else — anonymous actors,
    /// non-admins, and requests for boards that don't exist — gets the same
    /// `NotAuthorized` answer.
    ///
    /// Returns the validated actor so handlers can apply the self-guards.
    pub async fn require_board_admin(
        &self,
        actor: Option<&UserId>,
        board_id: &BoardId,
    ) -> Result<UserId, ApiError> {
        let Some(user_id) = actor else {
            return Err(ApiError::NotAuthorized);
        };

        self.store.get_board(board_id).await.map_err(|e| match e {
            StoreError::NotFound => ApiError::NotAuthorized,
            e => internal(e),
        })?;

        if self.holds_admin(user_id, board_id).await? {
            Ok(user_id.clone())
        } else {
            Err(ApiError::NotAuthorized)
        }
    }

    /// ADMIN held directly, or through any group the user belongs to.
    async fn holds_admin(&self, user_id: &UserId, board_id: &BoardId) -> Result<bool, ApiError> {
        match self
            .store
            .find_permission(board_id, &PrincipalRef::User(user_id.clone()))
            .await
        {
            Ok(p) if p.role.includes(&Role::Admin) => return Ok(true),
            Ok(_) => {}
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(internal(e)),
        }

        let groups = self
            .store
            .list_user_groups(user_id)
            .await
            .map_err(internal)?;
        for group in groups {
            match self
                .store
                .find_permission(board_id, &PrincipalRef::Group(group.id))
                .await
            {
                Ok(p) if p.role.includes(&Role::Admin) => return Ok(true),
                Ok(_) => {}
                Err(StoreError::NotFound) => {}
                Err(e) => return Err(internal(e)),
            }
        }

        Ok(false)
    }
}

/// Read the current actor from the trusted header. A missing or malformed
/// value means anonymous; the gate turns that into a 404.
pub fn extract_actor(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get(ACTOR_HEADER)?
        .to_str()
        .ok()
        .and_then(|s| Uuid::try_parse(s).ok())
        .map(UserId)
}

pub fn router(server: BoardServer) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route(
            "/boards/{board_id}/permissions",
            get(permissions::index).post(permissions::create),
        )
        .route(
            "/boards/{board_id}/permissions/search",
            get(permissions::search),
        )
        .route(
            "/boards/{board_id}/permissions/{id}",
            get(permissions::show)
                .patch(permissions::update)
                .delete(permissions::destroy),
        )
        .with_state(server)
}

async fn health_handler() -> &'static str {
    "ok"
}
