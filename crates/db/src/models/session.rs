//! Refresh-token sessions for student and staff logins.

use campus_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// One issued refresh token. Only the SHA-256 of the token is stored.
///
/// Refresh revokes the row it consumed; logout revokes all of a user's rows.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload written on login and on every refresh.
pub struct CreateSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}
