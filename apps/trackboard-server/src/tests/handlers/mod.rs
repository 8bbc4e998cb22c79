//! HTTP handler integration tests, driven through the real router.

mod permissions;
