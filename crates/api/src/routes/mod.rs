pub mod auth;
pub mod courses;
pub mod health;
pub mod students;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
///
/// /students                                        list
/// /students/register                               register (public, multipart)
/// /students/enroll                                 enroll caller in a course
/// /students/courses                                caller's courses
/// /students/courses/{id}                           course detail, first module
/// /students/courses/{id}/modules/{module_id}       course detail, chosen module
/// /students/{id}                                   get, update, delete
///
/// /courses                                         create (staff)
/// /courses/{id}/modules                            add module (staff)
/// ```
///
/// `/students/import` is added by `build_app_router`, outside the request
/// timeout.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/students", students::router())
        .nest("/courses", courses::router())
}
