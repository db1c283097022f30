//! Handler for bulk student import (`POST /students/import`).
//!
//! Every outcome, including a refused upload, is answered with 200 and an
//! [`ImportOutcome`] so the uploader always gets the messages list back.

use axum::extract::{Multipart, State};
use axum::Json;
use campus_core::student_import::{import_students, HeaderMode, ImportOutcome, Upload};

use crate::accounts::PgStudentStore;
use crate::error::AppResult;
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the CSV file.
pub const FILE_FIELD: &str = "studentprofile";

/// Optional multipart field choosing the header mode for this run.
pub const HEADER_FIELD: &str = "header";

/// POST /api/v1/students/import
///
/// Multipart form with the CSV in `studentprofile` and an optional `header`
/// (`skip`, `detect` or `none`). Staff only.
pub async fn import(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<ImportOutcome>>> {
    let form = match read_import_form(multipart).await {
        Ok(form) => form,
        Err(message) => {
            tracing::warn!(user_id = user.user_id, %message, "Student import upload refused");
            return Ok(Json(DataResponse {
                data: ImportOutcome::rejected(message),
            }));
        }
    };

    let options = state.config.import.options(form.header);
    let store = PgStudentStore::new(state.pool.clone()).await?;

    tracing::info!(
        user_id = user.user_id,
        file = form.upload.as_ref().map(|u| u.file_name.as_str()).unwrap_or(""),
        header = %options.header,
        "Starting student import"
    );

    let outcome = import_students(form.upload, &options, &store).await;

    tracing::info!(
        user_id = user.user_id,
        status = ?outcome.status,
        successful = outcome.successful_imports.unwrap_or(0),
        failed = outcome.failed_imports.unwrap_or(0),
        "Student import finished"
    );

    Ok(Json(DataResponse { data: outcome }))
}

/// The fields of an import request.
struct ImportForm {
    upload: Option<Upload>,
    header: Option<HeaderMode>,
}

/// Read the multipart body. `Err` carries the message to reject the run with.
async fn read_import_form(mut multipart: Multipart) -> Result<ImportForm, String> {
    let mut upload = None;
    let mut header = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Error processing CSV file: {e}"))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            FILE_FIELD => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Error processing CSV file: {e}"))?;
                // Browsers send an empty, unnamed part when no file was chosen.
                if !(file_name.is_empty() && content.is_empty()) {
                    upload = Some(Upload {
                        file_name,
                        content: content.to_vec(),
                    });
                }
            }
            HEADER_FIELD => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| format!("Error processing CSV file: {e}"))?;
                if !text.trim().is_empty() {
                    header = Some(text.parse::<HeaderMode>()?);
                }
            }
            _ => {}
        }
    }

    Ok(ImportForm { upload, header })
}
