//! Route definitions for the `/students` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, MethodRouter};
use axum::Router;

use crate::config::ServerConfig;
use crate::handlers::{enrollment, student, student_import};
use crate::state::AppState;

/// Routes mounted at `/students`.
///
/// `POST /import` is mounted separately by [`import_route`].
///
/// ```text
/// GET    /                                      -> list
/// POST   /register                              -> register (public, multipart)
/// POST   /enroll                                -> enroll
/// GET    /courses                               -> my_courses
/// GET    /courses/{id}                          -> course_detail
/// GET    /courses/{id}/modules/{module_id}      -> course_module_detail
/// GET    /{id}                                  -> get_by_id
/// PUT    /{id}                                  -> update (staff)
/// DELETE /{id}                                  -> delete (staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(student::list))
        .route("/register", post(student::register))
        .route("/enroll", post(enrollment::enroll))
        .route("/courses", get(enrollment::my_courses))
        .route("/courses/{id}", get(enrollment::course_detail))
        .route(
            "/courses/{id}/modules/{module_id}",
            get(enrollment::course_module_detail),
        )
        .route(
            "/{id}",
            get(student::get_by_id)
                .put(student::update)
                .delete(student::delete),
        )
}

/// `POST /students/import` (staff, multipart), with the body capped at
/// `STUDENT_IMPORT_MAX_BYTES`.
///
/// Not covered by the request timeout: an import hashes one password per row.
pub fn import_route(config: &ServerConfig) -> MethodRouter<AppState> {
    post(student_import::import).layer(DefaultBodyLimit::max(config.import.max_bytes))
}
