//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000002_create_roles_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_STUDENT: &str = "student";

/// Whether the role may manage student records (import, edit, delete).
pub fn can_manage_students(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_STAFF
}
