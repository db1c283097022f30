//! Handlers for the `/courses` resource (staff seeding of courses and modules).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use campus_core::error::CoreError;
use campus_core::types::DbId;
use campus_db::models::course::{Course, CourseModule, CreateCourse, CreateCourseModule};
use campus_db::repositories::{CourseModuleRepo, CourseRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/courses
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Json(input): Json<CreateCourse>,
) -> AppResult<(StatusCode, Json<DataResponse<Course>>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "title must not be blank".into(),
        )));
    }
    let course = CourseRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: course })))
}

/// POST /api/v1/courses/{id}/modules
pub async fn add_module(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(course_id): Path<DbId>,
    Json(input): Json<CreateCourseModule>,
) -> AppResult<(StatusCode, Json<DataResponse<CourseModule>>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "title must not be blank".into(),
        )));
    }
    CourseRepo::find_by_id(&state.pool, course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))?;

    let module = CourseModuleRepo::create(&state.pool, course_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: module })))
}
