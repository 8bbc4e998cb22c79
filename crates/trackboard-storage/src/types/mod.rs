//! Type definitions for trackboard storage.

mod boards;
mod groups;
mod ids;
mod permissions;
mod principals;
mod roles;
mod users;

// Re-export all types from submodules
pub use boards::*;
pub use groups::*;
pub use ids::*;
pub use permissions::*;
pub use principals::*;
pub use roles::*;
pub use users::*;
