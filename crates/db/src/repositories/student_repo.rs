//! Repository for the `student_profiles` table.
//!
//! Every read joins the owning account so profiles carry their email.

use campus_core::types::DbId;
use sqlx::PgPool;

use crate::models::student::{CreateStudentProfile, StudentProfile, UpdateStudentProfile};
use crate::models::user::CreateUser;

/// Column list shared across queries (aliases: `p` profile, `u` user).
const COLUMNS: &str = "p.id, p.user_id, u.email, p.first_name, p.other_name, p.last_name, \
                       p.gender, p.student_class, p.date_of_birth, p.date_admitted, p.address, \
                       p.mugshot, p.created_at, p.updated_at";

const FROM: &str = "student_profiles p JOIN users u ON u.id = p.user_id";

/// Provides CRUD operations for student profiles.
pub struct StudentRepo;

impl StudentRepo {
    /// Create an account and its profile in one transaction.
    ///
    /// If either insert fails nothing is committed, so a rejected profile
    /// never leaves an orphaned account behind.
    pub async fn create_with_account(
        pool: &PgPool,
        user: &CreateUser,
        profile: &CreateStudentProfile,
    ) -> Result<StudentProfile, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (user_id,): (DbId,) = sqlx::query_as(
            "INSERT INTO users (email, password_hash, role_id, is_student)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role_id)
        .bind(user.is_student)
        .fetch_one(&mut *tx)
        .await?;

        let fields = &profile.fields;
        let (profile_id,): (DbId,) = sqlx::query_as(
            "INSERT INTO student_profiles
                (user_id, first_name, other_name, last_name, gender, student_class,
                 date_of_birth, date_admitted, address, mugshot)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING id",
        )
        .bind(user_id)
        .bind(&fields.first_name)
        .bind(&fields.other_name)
        .bind(&fields.last_name)
        .bind(&fields.gender)
        .bind(&fields.student_class)
        .bind(fields.date_of_birth)
        .bind(fields.date_admitted)
        .bind(&fields.address)
        .bind(&profile.mugshot)
        .fetch_one(&mut *tx)
        .await?;

        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE p.id = $1");
        let created = sqlx::query_as::<_, StudentProfile>(&query)
            .bind(profile_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Find a profile by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<StudentProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE p.id = $1");
        sqlx::query_as::<_, StudentProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the profile owned by an account.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<StudentProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE p.user_id = $1");
        sqlx::query_as::<_, StudentProfile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List all profiles, highest class first.
    pub async fn list(pool: &PgPool) -> Result<Vec<StudentProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} ORDER BY p.student_class DESC, p.id ASC");
        sqlx::query_as::<_, StudentProfile>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a profile. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateStudentProfile,
    ) -> Result<Option<StudentProfile>, sqlx::Error> {
        let query = format!(
            "WITH p AS (
                UPDATE student_profiles SET
                    first_name = COALESCE($2, first_name),
                    other_name = COALESCE($3, other_name),
                    last_name = COALESCE($4, last_name),
                    gender = COALESCE($5, gender),
                    student_class = COALESCE($6, student_class),
                    date_of_birth = COALESCE($7, date_of_birth),
                    date_admitted = COALESCE($8, date_admitted),
                    address = COALESCE($9, address)
                WHERE id = $1
                RETURNING *
             )
             SELECT {COLUMNS} FROM p JOIN users u ON u.id = p.user_id"
        );
        sqlx::query_as::<_, StudentProfile>(&query)
            .bind(id)
            .bind(&input.first_name)
            .bind(&input.other_name)
            .bind(&input.last_name)
            .bind(&input.gender)
            .bind(&input.student_class)
            .bind(input.date_of_birth)
            .bind(input.date_admitted)
            .bind(&input.address)
            .fetch_optional(pool)
            .await
    }

    /// Delete a profile. The owning account is kept. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM student_profiles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
