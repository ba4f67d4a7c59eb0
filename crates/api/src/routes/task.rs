//! Route definitions for the `/tasks` resource.

use axum::routing::{get, patch, put};
use axum::Router;

use crate::handlers::task;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /                        -> list_mine
/// POST   /                        -> create
/// PUT    /{id}                    -> update
/// DELETE /{id}                    -> delete
/// PATCH  /{id}/toggle             -> toggle
/// GET    /project/{project_id}    -> list_by_project
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(task::list_mine).post(task::create))
        .route("/{id}", put(task::update).delete(task::delete))
        .route("/{id}/toggle", patch(task::toggle))
        .route("/project/{project_id}", get(task::list_by_project))
}
