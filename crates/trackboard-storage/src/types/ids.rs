//! Strongly-typed identifiers (avoid mixing strings/UUIDs arbitrarily).

use uuid::Uuid;

/// User identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

/// Group identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupId(pub Uuid);

/// Board identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoardId(pub Uuid);

/// Permission record identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PermissionId(pub Uuid);
