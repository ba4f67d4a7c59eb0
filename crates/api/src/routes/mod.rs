pub mod auth;
pub mod health;
pub mod project;
pub mod task;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                     signup (public)
/// /auth/login                      login (public)
/// /auth/me                         caller's profile
///
/// /projects                        list, create
/// /projects/with-users-tasks       admin overview
/// /projects/{id}                   get, update, delete (owner-scoped)
/// /projects/{id}/progress          completion percentage (owner-scoped)
///
/// /tasks                           list mine, create
/// /tasks/{id}                      update, delete
/// /tasks/{id}/toggle               advance status
/// /tasks/project/{project_id}      list by project
///
/// /users                           list
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/projects", project::router())
        .nest("/tasks", task::router())
        .nest("/users", user::router())
}
