//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- The caller identified by a JWT Bearer token.
//! - [`rbac::RequireStaff`] -- Requires the `staff` or `admin` role.

pub mod auth;
pub mod rbac;
