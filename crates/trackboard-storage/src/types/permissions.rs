//! Permission records: `(board, principal) -> role`.

use chrono::{DateTime, Utc};

use super::{BoardId, PermissionId, PrincipalRef, Role};

/// A role assignment for one principal on one board.
///
/// At most one record exists per `(board, principal)` pair; only the role
/// is mutable after creation.
#[derive(Clone, Debug)]
pub struct Permission {
    pub id: PermissionId,
    pub board_id: BoardId,
    pub principal: PrincipalRef,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Parameters for granting a permission
#[derive(Clone, Debug)]
pub struct GrantPermissionParams {
    pub board_id: BoardId,
    pub principal: PrincipalRef,
    pub role: Role,
}
