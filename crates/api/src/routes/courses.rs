//! Route definitions for the `/courses` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::course;
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// POST /                -> create      (staff)
/// POST /{id}/modules    -> add_module  (staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(course::create))
        .route("/{id}/modules", post(course::add_module))
}
