//! Student profile model and DTOs.

use campus_core::student::ProfileFields;
use campus_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A `student_profiles` row joined with its owning account's email.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentProfile {
    pub id: DbId,
    pub user_id: DbId,
    pub email: String,
    pub first_name: String,
    pub other_name: String,
    pub last_name: String,
    pub gender: String,
    pub student_class: String,
    pub date_of_birth: Date,
    pub date_admitted: Date,
    pub address: String,
    pub mugshot: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a profile alongside its account.
#[derive(Debug, Clone)]
pub struct CreateStudentProfile {
    pub fields: ProfileFields,
    pub mugshot: Option<String>,
}

/// DTO for updating a profile. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStudentProfile {
    pub first_name: Option<String>,
    pub other_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub student_class: Option<String>,
    pub date_of_birth: Option<Date>,
    pub date_admitted: Option<Date>,
    pub address: Option<String>,
}
