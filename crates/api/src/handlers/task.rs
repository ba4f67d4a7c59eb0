//! Handlers for the `/tasks` resource.
//!
//! Any authenticated user may create, modify and delete any task. Every write
//! runs the status through [`Completion`] so `completed_at` tracks "Completed".

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use taskflow_core::error::CoreError;
use taskflow_core::lifecycle::Completion;
use taskflow_core::policy::{Action, Resource};
use taskflow_core::types::DbId;
use taskflow_core::validation::validate_input;
use taskflow_db::models::task::{
    CreateTask, NewTask, Task, TaskPatch, TaskWithAssignee, UpdateTask,
};
use taskflow_db::models::user::UserSummary;
use taskflow_db::Store;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::response::MessageResponse;
use crate::state::AppState;

fn task_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Task", id })
}

/// 404 unless `assignee_id` is absent or names an existing user.
async fn ensure_assignee(store: &dyn Store, assignee_id: Option<DbId>) -> AppResult<()> {
    if let Some(id) = assignee_id {
        if store.find_user(id).await?.is_none() {
            return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
        }
    }
    Ok(())
}

/// Attach each task's assignee summary. A dangling assignee id renders as
/// `null`.
pub(crate) async fn with_assignees(
    store: &dyn Store,
    tasks: Vec<Task>,
) -> AppResult<Vec<TaskWithAssignee>> {
    if tasks.iter().all(|t| t.assignee_id.is_none()) {
        return Ok(tasks
            .into_iter()
            .map(|task| TaskWithAssignee {
                task,
                assignee: None,
            })
            .collect());
    }

    let users: HashMap<DbId, UserSummary> = store
        .list_users()
        .await?
        .iter()
        .map(|u| (u.id, UserSummary::from(u)))
        .collect();

    Ok(tasks
        .into_iter()
        .map(|task| {
            let assignee = task.assignee_id.and_then(|id| users.get(&id).cloned());
            TaskWithAssignee { task, assignee }
        })
        .collect())
}

/// POST /api/tasks
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateTask>,
) -> AppResult<(StatusCode, Json<Task>)> {
    user.authorize(Action::Create, Resource::Task)?;
    validate_input(&input)?;

    let project_id = input
        .project
        .ok_or_else(|| AppError::Core(CoreError::Validation("project is required".into())))?;

    if state.store.find_project(project_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }));
    }
    ensure_assignee(state.store.as_ref(), input.assignee_id).await?;

    let task = state
        .store
        .create_task(&NewTask {
            title: input.title,
            description: input.description,
            completion: Completion::initial(input.status.unwrap_or_default(), Utc::now()),
            project_id,
            created_by: user.user_id,
            assignee_id: input.assignee_id,
        })
        .await?;

    tracing::debug!(task_id = task.id, project_id, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /api/tasks/{id}
///
/// Partial update. An omitted status leaves status and `completed_at` as
/// they are.
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateTask>,
) -> AppResult<Json<Task>> {
    user.authorize(Action::Update, Resource::Task)?;
    validate_input(&input)?;

    let current = state
        .store
        .find_task(id)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    ensure_assignee(state.store.as_ref(), input.assignee_id).await?;

    let patch = TaskPatch {
        title: input.title,
        description: input.description,
        assignee_id: input.assignee_id,
        completion: current.completion().apply(input.status, Utc::now()),
    };

    // The row may have been deleted since it was read.
    let task = state
        .store
        .update_task(id, &patch)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    Ok(Json(task))
}

/// DELETE /api/tasks/{id}
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    user.authorize(Action::Delete, Resource::Task)?;

    if !state.store.delete_task(id).await? {
        return Err(task_not_found(id));
    }
    Ok(Json(MessageResponse::new("Task deleted")))
}

/// GET /api/tasks/project/{project_id}
///
/// An unknown project yields an empty list, not 404. Tasks left behind by
/// an interrupted project delete are not listed.
pub async fn list_by_project(
    user: AuthUser,
    State(state): State<AppState>,
    AppPath(project_id): AppPath<DbId>,
) -> AppResult<Json<Vec<TaskWithAssignee>>> {
    user.authorize(Action::Read, Resource::Task)?;

    if state.store.find_project(project_id).await?.is_none() {
        return Ok(Json(Vec::new()));
    }
    let tasks = state.store.list_tasks_by_project(project_id).await?;
    Ok(Json(with_assignees(state.store.as_ref(), tasks).await?))
}

/// GET /api/tasks
///
/// Tasks the caller created.
pub async fn list_mine(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Task>>> {
    user.authorize(Action::Read, Resource::Task)?;

    let tasks = state.store.list_tasks_by_creator(user.user_id).await?;
    Ok(Json(tasks))
}

/// PATCH /api/tasks/{id}/toggle
///
/// Advance the status one step around the cycle.
pub async fn toggle(
    user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<Task>> {
    user.authorize(Action::Update, Resource::Task)?;

    let current = state
        .store
        .find_task(id)
        .await?
        .ok_or_else(|| task_not_found(id))?;

    let patch = TaskPatch::status_only(current.completion().toggle(Utc::now()));
    let task = state
        .store
        .update_task(id, &patch)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    Ok(Json(task))
}
