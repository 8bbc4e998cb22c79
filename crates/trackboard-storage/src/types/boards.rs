//! Board types.

use chrono::{DateTime, Utc};

use super::BoardId;

/// Board record: the container permissions attach to.
#[derive(Clone, Debug)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a board
#[derive(Clone, Debug)]
pub struct CreateBoardParams {
    pub name: String,
}
