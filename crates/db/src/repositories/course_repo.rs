//! Repositories for courses, their modules, and student enrollments.

use campus_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::{Course, CourseModule, CreateCourse, CreateCourseModule};

const COURSE_COLUMNS: &str = "c.id, c.title, c.overview, c.created_at, c.updated_at";

const MODULE_COLUMNS: &str =
    "id, course_id, title, description, sort_order, created_at, updated_at";

/// Provides operations for courses.
pub struct CourseRepo;

impl CourseRepo {
    /// Insert a new course, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCourse) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses AS c (title, overview)
             VALUES ($1, $2)
             RETURNING {COURSE_COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(&input.title)
            .bind(&input.overview)
            .fetch_one(pool)
            .await
    }

    /// Find a course by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COURSE_COLUMNS} FROM courses c WHERE c.id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a course only if `student_id` is enrolled in it.
    pub async fn find_enrolled(
        pool: &PgPool,
        id: DbId,
        student_id: DbId,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "SELECT {COURSE_COLUMNS} FROM courses c
             JOIN course_enrollments e ON e.course_id = c.id
             WHERE c.id = $1 AND e.student_id = $2"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(student_id)
            .fetch_optional(pool)
            .await
    }

    /// List the courses a student is enrolled in, oldest enrollment first.
    pub async fn list_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!(
            "SELECT {COURSE_COLUMNS} FROM courses c
             JOIN course_enrollments e ON e.course_id = c.id
             WHERE e.student_id = $1
             ORDER BY e.enrolled_at ASC, c.id ASC"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(student_id)
            .fetch_all(pool)
            .await
    }
}

/// Provides operations for course modules.
pub struct CourseModuleRepo;

impl CourseModuleRepo {
    /// Insert a module into a course. `sort_order` defaults to 0.
    pub async fn create(
        pool: &PgPool,
        course_id: DbId,
        input: &CreateCourseModule,
    ) -> Result<CourseModule, sqlx::Error> {
        let query = format!(
            "INSERT INTO course_modules (course_id, title, description, sort_order)
             VALUES ($1, $2, $3, COALESCE($4, 0))
             RETURNING {MODULE_COLUMNS}"
        );
        sqlx::query_as::<_, CourseModule>(&query)
            .bind(course_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    /// Find a module that belongs to the given course.
    pub async fn find_in_course(
        pool: &PgPool,
        course_id: DbId,
        id: DbId,
    ) -> Result<Option<CourseModule>, sqlx::Error> {
        let query =
            format!("SELECT {MODULE_COLUMNS} FROM course_modules WHERE id = $1 AND course_id = $2");
        sqlx::query_as::<_, CourseModule>(&query)
            .bind(id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// The first module of a course by sort order, if the course has any.
    pub async fn first_in_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Option<CourseModule>, sqlx::Error> {
        let query = format!(
            "SELECT {MODULE_COLUMNS} FROM course_modules
             WHERE course_id = $1
             ORDER BY sort_order ASC, id ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, CourseModule>(&query)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }
}

/// Provides operations on the `course_enrollments` join table.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Enroll a student in a course. Re-enrolling is a no-op.
    ///
    /// Returns `true` if a new enrollment row was inserted.
    pub async fn enroll(
        pool: &PgPool,
        course_id: DbId,
        student_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO course_enrollments (course_id, student_id)
             VALUES ($1, $2)
             ON CONFLICT (course_id, student_id) DO NOTHING",
        )
        .bind(course_id)
        .bind(student_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
