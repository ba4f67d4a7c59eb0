//! Handlers for the `/projects` resource.
//!
//! The list is unscoped. Single-project fetch, update, delete and progress
//! match on id AND owner, so only the creator can address a project by id.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use taskflow_core::error::CoreError;
use taskflow_core::lifecycle::progress_percent;
use taskflow_core::types::DbId;
use taskflow_core::validation::validate_input;
use taskflow_db::cascade;
use taskflow_db::models::project::{CreateProject, Project, ProjectWithTasks, UpdateProject};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::task::with_assignees;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{
    OverviewRead, Permitted, ProjectCreate, ProjectDelete, ProjectUpdate,
};
use crate::response::MessageResponse;
use crate::state::AppState;

/// Response for `GET /projects/{id}/progress`.
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    /// Percentage of tasks in "Completed", rounded; 0 with no tasks.
    pub progress: u32,
}

fn project_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Project",
        id,
    })
}

/// POST /api/projects
pub async fn create(
    Permitted(user, _): Permitted<ProjectCreate>,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    validate_input(&input)?;
    let project = state.store.create_project(user.user_id, &input).await?;
    tracing::info!(project_id = project.id, owner_id = user.user_id, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects
pub async fn list(_user: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<Project>>> {
    let projects = state.store.list_projects().await?;
    Ok(Json(projects))
}

/// GET /api/projects/{id}
pub async fn get_by_id(
    user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<Project>> {
    let project = state
        .store
        .find_owned_project(id, user.user_id)
        .await?
        .ok_or_else(|| project_not_found(id))?;
    Ok(Json(project))
}

/// PUT /api/projects/{id}
pub async fn update(
    Permitted(user, _): Permitted<ProjectUpdate>,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateProject>,
) -> AppResult<Json<Project>> {
    validate_input(&input)?;
    let project = state
        .store
        .update_owned_project(id, user.user_id, &input)
        .await?
        .ok_or_else(|| project_not_found(id))?;
    Ok(Json(project))
}

/// DELETE /api/projects/{id}
///
/// Removes the project, then every task that references it.
pub async fn delete(
    Permitted(user, _): Permitted<ProjectDelete>,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    cascade::delete_project(state.store.as_ref(), id, user.user_id).await?;
    Ok(Json(MessageResponse::new("Project and its tasks deleted")))
}

/// GET /api/projects/{id}/progress
pub async fn progress(
    user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ProgressResponse>> {
    state
        .store
        .find_owned_project(id, user.user_id)
        .await?
        .ok_or_else(|| project_not_found(id))?;

    let tasks = state.store.list_tasks_by_project(id).await?;
    Ok(Json(ProgressResponse {
        progress: progress_percent(tasks.iter().map(|t| t.status)),
    }))
}

/// GET /api/projects/with-users-tasks
///
/// Admin overview: every project with its tasks and their assignees.
pub async fn with_users_tasks(
    _admin: Permitted<OverviewRead>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProjectWithTasks>>> {
    let projects = state.store.list_projects().await?;

    let mut overview = Vec::with_capacity(projects.len());
    for project in projects {
        let tasks = state.store.list_tasks_by_project(project.id).await?;
        overview.push(ProjectWithTasks {
            tasks: with_assignees(state.store.as_ref(), tasks).await?,
            project,
        });
    }
    Ok(Json(overview))
}
