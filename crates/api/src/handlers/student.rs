//! Handlers for the `/students` resource (registration and profile CRUD).

use std::path::Path as FsPath;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use campus_core::error::CoreError;
use campus_core::student::StudentForm;
use campus_core::types::DbId;
use campus_db::models::student::{StudentProfile, UpdateStudentProfile};
use campus_db::repositories::StudentRepo;

use crate::accounts::{create_student_account, student_role_id};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// Accepted photo extensions for `mugshot` uploads.
const MUGSHOT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Subdirectory of the media root that holds student photos.
const MUGSHOT_DIR: &str = "mugshots";

/// POST /api/v1/students/register
///
/// Multipart form with the account and profile fields plus an optional
/// `mugshot` file. Creates the account and profile together.
pub async fn register(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<StudentProfile>>)> {
    let mut form = StudentForm::default();
    let mut mugshot: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "mugshot" {
            let filename = field.file_name().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            if !data.is_empty() {
                mugshot = Some((filename, data.to_vec()));
            }
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.set(&name, text);
        }
    }

    let mut student = form.into_new_student(None)?;

    let stored_photo = match mugshot {
        Some((filename, data)) => {
            let relative = store_mugshot(&state.config.media_root, &filename, &data).await?;
            student.mugshot = Some(relative.clone());
            Some(relative)
        }
        None => None,
    };

    let role_id = student_role_id(&state.pool).await?;
    let profile = match create_student_account(&state.pool, role_id, &student).await {
        Ok(profile) => profile,
        Err(e) => {
            if let Some(relative) = stored_photo {
                let _ = tokio::fs::remove_file(state.config.media_root.join(relative)).await;
            }
            return Err(e.into());
        }
    };

    tracing::info!(profile_id = profile.id, user_id = profile.user_id, "Student registered");
    Ok((StatusCode::CREATED, Json(DataResponse { data: profile })))
}

/// GET /api/v1/students
///
/// All profiles, highest class first.
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<StudentProfile>>>> {
    let students = StudentRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: students }))
}

/// GET /api/v1/students/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<StudentProfile>>> {
    let student = StudentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "StudentProfile",
            id,
        }))?;
    Ok(Json(DataResponse { data: student }))
}

/// PUT /api/v1/students/{id}
///
/// Partial update of biographical fields. Staff only.
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStudentProfile>,
) -> AppResult<Json<DataResponse<StudentProfile>>> {
    reject_blank_required(&input)?;

    let student = StudentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "StudentProfile",
            id,
        }))?;

    tracing::info!(profile_id = id, updated_by = user.user_id, "Student profile updated");
    Ok(Json(DataResponse { data: student }))
}

/// DELETE /api/v1/students/{id}
///
/// Removes the profile and its enrollments; the login account is kept.
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !StudentRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "StudentProfile",
            id,
        }));
    }
    tracing::info!(profile_id = id, deleted_by = user.user_id, "Student profile deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Required profile fields may be omitted from an update but not blanked.
fn reject_blank_required(input: &UpdateStudentProfile) -> Result<(), AppError> {
    let required = [
        ("first_name", &input.first_name),
        ("last_name", &input.last_name),
        ("gender", &input.gender),
        ("student_class", &input.student_class),
    ];
    for (name, value) in required {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "{name} must not be blank"
            ))));
        }
    }
    Ok(())
}

/// Write an uploaded photo under `media_root` and return its relative path.
async fn store_mugshot(media_root: &FsPath, filename: &str, data: &[u8]) -> AppResult<String> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if !MUGSHOT_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unsupported image format '.{ext}'. Supported: {}",
            MUGSHOT_EXTENSIONS.join(", ")
        )));
    }

    let dir = media_root.join(MUGSHOT_DIR);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create media dir: {e}")))?;

    let stored_name = format!("{}.{ext}", uuid::Uuid::new_v4());
    tokio::fs::write(dir.join(&stored_name), data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store mugshot: {e}")))?;

    Ok(format!("{MUGSHOT_DIR}/{stored_name}"))
}
