//! Handlers for the calling student's enrollments (`/students/enroll`,
//! `/students/courses`).

use axum::extract::{Path, State};
use axum::Json;
use campus_core::error::CoreError;
use campus_core::types::DbId;
use campus_db::models::course::{Course, CourseModule};
use campus_db::models::student::StudentProfile;
use campus_db::repositories::{CourseModuleRepo, CourseRepo, EnrollmentRepo, StudentRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /students/enroll`.
#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub course_id: DbId,
}

/// A course as seen by an enrolled student, with the module being viewed.
#[derive(Debug, Serialize)]
pub struct CourseDetail {
    pub course: Course,
    /// The requested module, or the first one; `None` if the course is empty.
    pub module: Option<CourseModule>,
}

/// POST /api/v1/students/enroll
///
/// Enroll the caller in a course. Enrolling twice is harmless.
pub async fn enroll(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<EnrollRequest>,
) -> AppResult<Json<DataResponse<Course>>> {
    let profile = caller_profile(&state, &user).await?;

    let course = CourseRepo::find_by_id(&state.pool, input.course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: input.course_id,
        }))?;

    let inserted = EnrollmentRepo::enroll(&state.pool, course.id, profile.id).await?;
    if inserted {
        tracing::info!(course_id = course.id, profile_id = profile.id, "Student enrolled");
    }

    Ok(Json(DataResponse { data: course }))
}

/// GET /api/v1/students/courses
pub async fn my_courses(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Course>>>> {
    let profile = caller_profile(&state, &user).await?;
    let courses = CourseRepo::list_for_student(&state.pool, profile.id).await?;
    Ok(Json(DataResponse { data: courses }))
}

/// GET /api/v1/students/courses/{id}
///
/// Course detail opened at its first module.
pub async fn course_detail(
    State(state): State<AppState>,
    user: AuthUser,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<DataResponse<CourseDetail>>> {
    let course = enrolled_course(&state, &user, course_id).await?;
    let module = CourseModuleRepo::first_in_course(&state.pool, course.id).await?;
    Ok(Json(DataResponse {
        data: CourseDetail { course, module },
    }))
}

/// GET /api/v1/students/courses/{id}/modules/{module_id}
pub async fn course_module_detail(
    State(state): State<AppState>,
    user: AuthUser,
    Path((course_id, module_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<CourseDetail>>> {
    let course = enrolled_course(&state, &user, course_id).await?;
    let module = CourseModuleRepo::find_in_course(&state.pool, course.id, module_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CourseModule",
            id: module_id,
        }))?;
    Ok(Json(DataResponse {
        data: CourseDetail {
            course,
            module: Some(module),
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The caller's student profile; 403 for accounts without one.
async fn caller_profile(state: &AppState, user: &AuthUser) -> AppResult<StudentProfile> {
    StudentRepo::find_by_user_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "Only students with a profile can take courses".into(),
            ))
        })
}

/// A course the caller is enrolled in; 404 otherwise.
async fn enrolled_course(state: &AppState, user: &AuthUser, course_id: DbId) -> AppResult<Course> {
    let profile = caller_profile(state, user).await?;
    CourseRepo::find_enrolled(&state.pool, course_id, profile.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))
}
