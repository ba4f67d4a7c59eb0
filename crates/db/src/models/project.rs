//! Project entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskflow_core::types::{DbId, Timestamp};
use validator::Validate;

use crate::models::task::TaskWithAssignee;

/// A project row from the `projects` table.
///
/// `owner_id` records the creator. It scopes single-project lookups but not
/// the project list.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: DbId,
    pub created_at: Timestamp,
}

/// DTO for creating a new project. The owner is the caller.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    #[serde(default)]
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    pub description: Option<String>,
}

/// DTO for updating a project. `title` is required on every update;
/// an omitted `description` keeps the stored one.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProject {
    #[serde(default)]
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    pub description: Option<String>,
}

/// A project with every task that references it (admin overview).
#[derive(Debug, Clone, Serialize)]
pub struct ProjectWithTasks {
    #[serde(flatten)]
    pub project: Project,
    pub tasks: Vec<TaskWithAssignee>,
}
