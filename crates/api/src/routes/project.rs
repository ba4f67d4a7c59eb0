//! Route definitions for the `/projects` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                    -> list
/// POST   /                    -> create (admin, manager)
/// GET    /with-users-tasks    -> with_users_tasks (admin)
/// GET    /{id}                -> get_by_id (owner)
/// PUT    /{id}                -> update (admin, manager; owner)
/// DELETE /{id}                -> delete (admin, manager; owner)
/// GET    /{id}/progress       -> progress (owner)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/with-users-tasks", get(project::with_users_tasks))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route("/{id}/progress", get(project::progress))
}
