//! Role types for board permission assignments.

use std::str::FromStr;

/// Role a principal can hold on a board.
///
/// The canonical wire/storage form is the uppercase token (`READ`, `EDIT`,
/// `ADMIN`); parsing accepts any casing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Read,
    Edit,
    Admin,
}

/// Error type for parsing Role from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError(pub String);

impl std::fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid role: {}", self.0)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "READ" => Ok(Role::Read),
            "EDIT" => Ok(Role::Edit),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Read => "READ",
            Role::Edit => "EDIT",
            Role::Admin => "ADMIN",
        }
    }

    /// Check if this role has at least the permissions of another role
    pub fn includes(&self, other: &Role) -> bool {
        match self {
            Role::Admin => true, // Admin includes all permissions
            Role::Edit => matches!(other, Role::Edit | Role::Read),
            Role::Read => matches!(other, Role::Read),
        }
    }
}
