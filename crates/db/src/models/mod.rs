//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - Create DTOs for inserts
//! - Update DTOs (all `Option` fields) for patches where the entity is editable

pub mod course;
pub mod role;
pub mod session;
pub mod student;
pub mod user;
