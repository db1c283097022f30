pub mod auth;
pub mod course;
pub mod enrollment;
pub mod student;
pub mod student_import;
