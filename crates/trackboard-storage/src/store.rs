//! The Store trait that backends implement.

use crate::types::*;
use crate::StoreError;

/// The storage trait the server depends on.
///
/// Permission operations are **scoped by board**; the `(board, principal)`
/// uniqueness invariant is the backend's responsibility (a real constraint,
/// not an application-level pre-check), so concurrent duplicate grants
/// resolve to one success and one `AlreadyExists`.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ───────────────────────────────────── Users ──────────────────────────────────────────

    /// Create a new user (returns generated ID).
    async fn create_user(&self, params: &CreateUserParams) -> Result<UserId, StoreError>;

    /// Get user by ID.
    async fn get_user(&self, user_id: &UserId) -> Result<User, StoreError>;

    /// List all known users, directory order.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    // ───────────────────────────────────── Groups ─────────────────────────────────────────

    /// Create a new group (returns generated ID).
    async fn create_group(&self, params: &CreateGroupParams) -> Result<GroupId, StoreError>;

    /// Get group by ID.
    async fn get_group(&self, group_id: &GroupId) -> Result<Group, StoreError>;

    /// List all known groups, directory order.
    async fn list_groups(&self) -> Result<Vec<Group>, StoreError>;

    /// Add a user to a group (idempotent).
    async fn add_group_member(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> Result<(), StoreError>;

    /// List the members of a group.
    async fn list_group_members(&self, group_id: &GroupId) -> Result<Vec<User>, StoreError>;

    /// List all groups a user belongs to.
    async fn list_user_groups(&self, user_id: &UserId) -> Result<Vec<Group>, StoreError>;

    // ───────────────────────────────────── Boards ─────────────────────────────────────────

    /// Create a new board (returns generated ID).
    async fn create_board(&self, params: &CreateBoardParams) -> Result<BoardId, StoreError>;

    /// Get board by ID.
    async fn get_board(&self, board_id: &BoardId) -> Result<Board, StoreError>;

    /// Delete a board and, with it, every permission attached to it.
    async fn delete_board(&self, board_id: &BoardId) -> Result<(), StoreError>;

    // ─────────────────────────────────── Permissions ──────────────────────────────────────

    /// Grant a role to a principal on a board.
    ///
    /// Fails with `AlreadyExists` when the principal already holds a
    /// permission on the board, regardless of the requested role.
    async fn grant_permission(
        &self,
        params: &GrantPermissionParams,
    ) -> Result<Permission, StoreError>;

    /// Get a single permission, scoped to its board.
    async fn get_permission(
        &self,
        board_id: &BoardId,
        permission_id: &PermissionId,
    ) -> Result<Permission, StoreError>;

    /// Find the permission a principal holds on a board, if any.
    async fn find_permission(
        &self,
        board_id: &BoardId,
        principal: &PrincipalRef,
    ) -> Result<Permission, StoreError>;

    /// List all permissions on a board, insertion order.
    async fn list_permissions(&self, board_id: &BoardId) -> Result<Vec<Permission>, StoreError>;

    /// Change the role of an existing permission (board/principal are
    /// immutable after creation).
    async fn update_permission_role(
        &self,
        permission_id: &PermissionId,
        role: Role,
    ) -> Result<Permission, StoreError>;

    /// Remove a permission record.
    async fn revoke_permission(&self, permission_id: &PermissionId) -> Result<(), StoreError>;
}
