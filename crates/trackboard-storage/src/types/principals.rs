//! Polymorphic principal references.

use uuid::Uuid;

use super::{GroupId, UserId};

/// A reference to a permission-holding actor: a user or a group.
///
/// Stored and transmitted as a `(type, id)` pair; dispatching on the
/// variant replaces any dynamically-typed association.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PrincipalRef {
    User(UserId),
    Group(GroupId),
}

impl PrincipalRef {
    /// Wire/storage tag for the principal type.
    pub fn kind(&self) -> &'static str {
        match self {
            PrincipalRef::User(_) => "user",
            PrincipalRef::Group(_) => "group",
        }
    }

    /// The underlying identifier, untyped.
    pub fn uuid(&self) -> Uuid {
        match self {
            PrincipalRef::User(id) => id.0,
            PrincipalRef::Group(id) => id.0,
        }
    }
}
