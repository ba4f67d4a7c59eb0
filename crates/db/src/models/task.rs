//! Task entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskflow_core::lifecycle::Completion;
use taskflow_core::task_status::TaskStatus;
use taskflow_core::types::{DbId, Timestamp};
use validator::Validate;

use crate::models::user::UserSummary;

/// A task row from the `tasks` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    pub project_id: DbId,
    pub created_by: DbId,
    pub assignee_id: Option<DbId>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl Task {
    pub fn completion(&self) -> Completion {
        Completion {
            status: self.status,
            completed_at: self.completed_at,
        }
    }
}

/// Request body for creating a task.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTask {
    #[serde(default)]
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    pub description: Option<String>,
    /// Defaults to "To Do" if omitted.
    pub status: Option<TaskStatus>,
    #[serde(alias = "project_id")]
    #[validate(required(message = "project is required"))]
    pub project: Option<DbId>,
    #[serde(alias = "assignee")]
    pub assignee_id: Option<DbId>,
}

/// Request body for updating a task. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTask {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    #[serde(alias = "assignee")]
    pub assignee_id: Option<DbId>,
}

/// Fully resolved insert, with the completion stamp already derived.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub completion: Completion,
    pub project_id: DbId,
    pub created_by: DbId,
    pub assignee_id: Option<DbId>,
}

/// Fully resolved update. Every field is written only when `Some`; a `None`
/// completion leaves status and `completed_at` as stored.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee_id: Option<DbId>,
    pub completion: Option<Completion>,
}

impl TaskPatch {
    /// A patch that only moves the status.
    pub fn status_only(completion: Completion) -> Self {
        Self {
            title: None,
            description: None,
            assignee_id: None,
            completion: Some(completion),
        }
    }
}

/// A task with its assignee's public profile populated.
#[derive(Debug, Clone, Serialize)]
pub struct TaskWithAssignee {
    #[serde(flatten)]
    pub task: Task,
    pub assignee: Option<UserSummary>,
}
