//! Domain types and pure logic for the student profile service.
//!
//! Nothing in this crate touches the database or the network; persistence is
//! reached through the [`student_import::StudentStore`] seam.

pub mod error;
pub mod roles;
pub mod student;
pub mod student_import;
pub mod types;
