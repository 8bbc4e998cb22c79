use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use uuid::Uuid;

use trackboard_storage::{
    Board, BoardId, CreateBoardParams, CreateGroupParams, CreateUserParams, GrantPermissionParams,
    Group, GroupId, Permission, PermissionId, PrincipalRef, Role, Store, StoreError, User, UserId,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open("sqlite::memory:").await
    }

    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .create_if_missing(true)
            // Cascading deletes depend on this; SQLite leaves it off by default.
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self { pool })
    }
}

fn map_unique(e: sqlx::Error) -> StoreError {
    let s = e.to_string();
    if s.contains("UNIQUE") {
        StoreError::AlreadyExists
    } else {
        StoreError::Backend(s)
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, StoreError> {
    Uuid::try_parse(s).map_err(|e| StoreError::Backend(e.to_string()))
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| StoreError::Backend(format!("invalid timestamp: {}", secs)))
}

type PermissionRow = (String, String, String, String, String, i64);

fn permission_from_row(row: PermissionRow) -> Result<Permission, StoreError> {
    let (id, board_id, principal_type, principal_id, role, created_at) = row;
    let principal_uuid = parse_uuid(&principal_id)?;
    let principal = match principal_type.as_str() {
        "user" => PrincipalRef::User(UserId(principal_uuid)),
        "group" => PrincipalRef::Group(GroupId(principal_uuid)),
        other => return Err(StoreError::Backend(format!("bad principal type: {}", other))),
    };
    Ok(Permission {
        id: PermissionId(parse_uuid(&id)?),
        board_id: BoardId(parse_uuid(&board_id)?),
        principal,
        role: Role::from_str(&role).map_err(|e| StoreError::Backend(e.to_string()))?,
        created_at: timestamp(created_at)?,
    })
}

#[async_trait::async_trait]
impl Store for SqliteStore {
    // ───────────────────────────── Users ──────────────────────────────

    async fn create_user(&self, p: &CreateUserParams) -> Result<UserId, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now().timestamp();
        sqlx::query("INSERT INTO users(id,name,email,created_at,updated_at) VALUES(?,?,?,?,?)")
            .bind(id.to_string())
            .bind(&p.name)
            .bind(&p.email)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_unique)?;
        Ok(UserId(id))
    }

    async fn get_user(&self, user_id: &UserId) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, (String, String, String, i64, i64)>(
            "SELECT id,name,email,created_at,updated_at FROM users WHERE id=?",
        )
        .bind(user_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        match row {
            None => Err(StoreError::NotFound),
            Some((id, name, email, created_at, updated_at)) => Ok(User {
                id: UserId(parse_uuid(&id)?),
                name,
                email,
                created_at: timestamp(created_at)?,
                updated_at: timestamp(updated_at)?,
            }),
        }
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String, String, i64, i64)>(
            "SELECT id,name,email,created_at,updated_at FROM users ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for (id, name, email, created_at, updated_at) in rows {
            out.push(User {
                id: UserId(parse_uuid(&id)?),
                name,
                email,
                created_at: timestamp(created_at)?,
                updated_at: timestamp(updated_at)?,
            });
        }
        Ok(out)
    }

    // ───────────────────────────── Groups ─────────────────────────────

    async fn create_group(&self, p: &CreateGroupParams) -> Result<GroupId, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now().timestamp();
        sqlx::query("INSERT INTO groups(id,name,created_at,updated_at) VALUES(?,?,?,?)")
            .bind(id.to_string())
            .bind(&p.name)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_unique)?;
        Ok(GroupId(id))
    }

    async fn get_group(&self, group_id: &GroupId) -> Result<Group, StoreError> {
        let row = sqlx::query_as::<_, (String, String, i64, i64)>(
            "SELECT id,name,created_at,updated_at FROM groups WHERE id=?",
        )
        .bind(group_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        match row {
            None => Err(StoreError::NotFound),
            Some((id, name, created_at, updated_at)) => Ok(Group {
                id: GroupId(parse_uuid(&id)?),
                name,
                created_at: timestamp(created_at)?,
                updated_at: timestamp(updated_at)?,
            }),
        }
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String, i64, i64)>(
            "SELECT id,name,created_at,updated_at FROM groups ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for (id, name, created_at, updated_at) in rows {
            out.push(Group {
                id: GroupId(parse_uuid(&id)?),
                name,
                created_at: timestamp(created_at)?,
                updated_at: timestamp(updated_at)?,
            });
        }
        Ok(out)
    }

    async fn add_group_member(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> Result<(), StoreError> {
        // Membership must reference existing rows; FK violations surface as Backend.
        self.get_group(group_id).await?;
        self.get_user(user_id).await?;

        sqlx::query(
            "INSERT INTO group_members(group_id,user_id,created_at) VALUES(?,?,?)
             ON CONFLICT(group_id,user_id) DO NOTHING",
        )
        .bind(group_id.0.to_string())
        .bind(user_id.0.to_string())
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn list_group_members(&self, group_id: &GroupId) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String, String, i64, i64)>(
            "SELECT u.id,u.name,u.email,u.created_at,u.updated_at
               FROM users u
               JOIN group_members m ON m.user_id=u.id
              WHERE m.group_id=?
              ORDER BY u.rowid",
        )
        .bind(group_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for (id, name, email, created_at, updated_at) in rows {
            out.push(User {
                id: UserId(parse_uuid(&id)?),
                name,
                email,
                created_at: timestamp(created_at)?,
                updated_at: timestamp(updated_at)?,
            });
        }
        Ok(out)
    }

    async fn list_user_groups(&self, user_id: &UserId) -> Result<Vec<Group>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String, i64, i64)>(
            "SELECT g.id,g.name,g.created_at,g.updated_at
               FROM groups g
               JOIN group_members m ON m.group_id=g.id
              WHERE m.user_id=?
              ORDER BY g.rowid",
        )
        .bind(user_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for (id, name, created_at, updated_at) in rows {
            out.push(Group {
                id: GroupId(parse_uuid(&id)?),
                name,
                created_at: timestamp(created_at)?,
                updated_at: timestamp(updated_at)?,
            });
        }
        Ok(out)
    }

    // ───────────────────────────── Boards ─────────────────────────────

    async fn create_board(&self, p: &CreateBoardParams) -> Result<BoardId, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now().timestamp();
        sqlx::query("INSERT INTO boards(id,name,created_at,updated_at) VALUES(?,?,?,?)")
            .bind(id.to_string())
            .bind(&p.name)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_unique)?;
        Ok(BoardId(id))
    }

    async fn get_board(&self, board_id: &BoardId) -> Result<Board, StoreError> {
        let row = sqlx::query_as::<_, (String, String, i64, i64)>(
            "SELECT id,name,created_at,updated_at FROM boards WHERE id=?",
        )
        .bind(board_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        match row {
            None => Err(StoreError::NotFound),
            Some((id, name, created_at, updated_at)) => Ok(Board {
                id: BoardId(parse_uuid(&id)?),
                name,
                created_at: timestamp(created_at)?,
                updated_at: timestamp(updated_at)?,
            }),
        }
    }

    async fn delete_board(&self, board_id: &BoardId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM boards WHERE id=?")
            .bind(board_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    // ─────────────────────────── Permissions ──────────────────────────

    async fn grant_permission(&self, p: &GrantPermissionParams) -> Result<Permission, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now().timestamp();
        sqlx::query(
            "INSERT INTO permissions(id,board_id,principal_type,principal_id,role,created_at)
             VALUES(?,?,?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(p.board_id.0.to_string())
        .bind(p.principal.kind())
        .bind(p.principal.uuid().to_string())
        .bind(p.role.as_str())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_unique)?;

        Ok(Permission {
            id: PermissionId(id),
            board_id: p.board_id.clone(),
            principal: p.principal.clone(),
            role: p.role,
            created_at: timestamp(now)?,
        })
    }

    async fn get_permission(
        &self,
        board_id: &BoardId,
        permission_id: &PermissionId,
    ) -> Result<Permission, StoreError> {
        let row = sqlx::query_as::<_, PermissionRow>(
            "SELECT id,board_id,principal_type,principal_id,role,created_at
               FROM permissions WHERE board_id=? AND id=?",
        )
        .bind(board_id.0.to_string())
        .bind(permission_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        match row {
            None => Err(StoreError::NotFound),
            Some(row) => permission_from_row(row),
        }
    }

    async fn find_permission(
        &self,
        board_id: &BoardId,
        principal: &PrincipalRef,
    ) -> Result<Permission, StoreError> {
        let row = sqlx::query_as::<_, PermissionRow>(
            "SELECT id,board_id,principal_type,principal_id,role,created_at
               FROM permissions WHERE board_id=? AND principal_type=? AND principal_id=?",
        )
        .bind(board_id.0.to_string())
        .bind(principal.kind())
        .bind(principal.uuid().to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        match row {
            None => Err(StoreError::NotFound),
            Some(row) => permission_from_row(row),
        }
    }

    async fn list_permissions(&self, board_id: &BoardId) -> Result<Vec<Permission>, StoreError> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            "SELECT id,board_id,principal_type,principal_id,role,created_at
               FROM permissions WHERE board_id=? ORDER BY rowid",
        )
        .bind(board_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.into_iter().map(permission_from_row).collect()
    }

    async fn update_permission_role(
        &self,
        permission_id: &PermissionId,
        role: Role,
    ) -> Result<Permission, StoreError> {
        let result = sqlx::query("UPDATE permissions SET role=? WHERE id=?")
            .bind(role.as_str())
            .bind(permission_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        let row = sqlx::query_as::<_, PermissionRow>(
            "SELECT id,board_id,principal_type,principal_id,role,created_at
               FROM permissions WHERE id=?",
        )
        .bind(permission_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        match row {
            None => Err(StoreError::NotFound),
            Some(row) => permission_from_row(row),
        }
    }

    async fn revoke_permission(&self, permission_id: &PermissionId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM permissions WHERE id=?")
            .bind(permission_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
