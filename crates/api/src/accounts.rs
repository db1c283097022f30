//! Creating student accounts.
//!
//! Registration and bulk import both end here: hash the password, then
//! insert the account and its profile in one transaction via
//! [`StudentRepo::create_with_account`].

use async_trait::async_trait;
use campus_core::error::CoreError;
use campus_core::roles::ROLE_STUDENT;
use campus_core::student::NewStudent;
use campus_core::student_import::{StoreError, StudentStore};
use campus_core::types::DbId;
use campus_db::is_unique_violation;
use campus_db::models::student::{CreateStudentProfile, StudentProfile};
use campus_db::models::user::CreateUser;
use campus_db::repositories::{RoleRepo, StudentRepo};
use sqlx::PgPool;

use crate::auth::password::hash_password;
use crate::error::AppError;

/// Why a student account could not be created.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("an account with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::DuplicateEmail(_) => AppError::Core(CoreError::Conflict(err.to_string())),
            AccountError::Hash(msg) => AppError::InternalError(msg),
            AccountError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<AccountError> for StoreError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::DuplicateEmail(email) => StoreError::DuplicateEmail(email),
            other => StoreError::Rejected(other.to_string()),
        }
    }
}

/// Look up the id of the seeded `student` role.
pub async fn student_role_id(pool: &PgPool) -> Result<DbId, AppError> {
    RoleRepo::find_by_name(pool, ROLE_STUDENT)
        .await?
        .map(|role| role.id)
        .ok_or_else(|| AppError::InternalError(format!("role '{ROLE_STUDENT}' is not seeded")))
}

/// Create a student account and its profile atomically.
///
/// The Argon2 hash is computed on the blocking thread pool.
pub async fn create_student_account(
    pool: &PgPool,
    role_id: DbId,
    student: &NewStudent,
) -> Result<StudentProfile, AccountError> {
    let password = student.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AccountError::Hash(format!("hashing task failed: {e}")))?
        .map_err(|e| AccountError::Hash(e.to_string()))?;

    let user = CreateUser {
        email: student.email.clone(),
        password_hash,
        role_id,
        is_student: true,
    };
    let profile = CreateStudentProfile {
        fields: student.profile.clone(),
        mugshot: student.mugshot.clone(),
    };

    StudentRepo::create_with_account(pool, &user, &profile)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "uq_users_email") {
                AccountError::DuplicateEmail(student.email.clone())
            } else {
                AccountError::Database(e)
            }
        })
}

/// [`StudentStore`] backed by PostgreSQL.
pub struct PgStudentStore {
    pool: PgPool,
    role_id: DbId,
}

impl PgStudentStore {
    /// Build a store, resolving the student role once up front.
    pub async fn new(pool: PgPool) -> Result<Self, AppError> {
        let role_id = student_role_id(&pool).await?;
        Ok(Self { pool, role_id })
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn create_student(&self, student: &NewStudent) -> Result<DbId, StoreError> {
        match create_student_account(&self.pool, self.role_id, student).await {
            Ok(profile) => {
                tracing::debug!(profile_id = profile.id, email = %profile.email, "Imported student");
                Ok(profile.id)
            }
            Err(e) => {
                tracing::warn!(email = %student.email, error = %e, "Student import row rejected");
                Err(e.into())
            }
        }
    }
}
