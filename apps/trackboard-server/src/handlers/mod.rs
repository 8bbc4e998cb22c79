//! Handler modules for the HTTP surface.
//!
//! - permissions: board permission management (index, show, search, create,
//!   update, destroy) plus principal resolution

pub mod permissions;
