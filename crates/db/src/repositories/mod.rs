//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod course_repo;
pub mod role_repo;
pub mod session_repo;
pub mod student_repo;
pub mod user_repo;

pub use course_repo::{CourseModuleRepo, CourseRepo, EnrollmentRepo};
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use student_repo::StudentRepo;
pub use user_repo::UserRepo;
