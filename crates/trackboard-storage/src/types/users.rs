//! User records from the host's directory.

use chrono::{DateTime, Utc};

use super::UserId;

/// User record
#[derive(Clone, Debug)]
pub struct User {
    pub id: UserId,
    /// Display name, e.g. "Dave2 Lopper2".
    pub name: String,
    /// Contact address; only used to derive the avatar URL.
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a user
#[derive(Clone, Debug)]
pub struct CreateUserParams {
    pub name: String,
    pub email: String,
}
