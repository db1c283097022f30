//! Account session routes, shared by students and staff.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// Students sign in with the email and password they registered or were
/// imported with; staff accounts use the same endpoints.
///
/// ```text
/// POST /login    -> login (email + password, lockout after repeated failures)
/// POST /refresh  -> refresh (rotates the refresh token)
/// POST /logout   -> logout (revokes every session of the caller)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
}
