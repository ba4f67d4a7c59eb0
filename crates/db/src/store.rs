//! Storage seam used by the HTTP layer.
//!
//! The handlers only see `Arc<dyn Store>`. [`PgStore`] is the production
//! backend and delegates to the repositories; [`crate::memory::MemoryStore`]
//! implements the same contract in-process for tests and local runs.

use async_trait::async_trait;
use taskflow_core::types::DbId;

use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::task::{NewTask, Task, TaskPatch};
use crate::models::user::{CreateUser, User};
use crate::repositories::{ProjectRepo, TaskRepo, UserRepo};
use crate::DbPool;

/// PostgreSQL SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL SQLSTATE for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (e.g. `uq_users_email`).
    #[error("Duplicate value violates unique constraint: {0}")]
    Duplicate(String),

    /// A write referenced a row that does not exist.
    #[error("{entity} with id {id} not found")]
    MissingReference { entity: &'static str, id: DbId },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, input: &CreateUser) -> Result<User, StoreError>;
    async fn find_user(&self, id: DbId) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn create_project(
        &self,
        owner_id: DbId,
        input: &CreateProject,
    ) -> Result<Project, StoreError>;
    /// Every project, unscoped.
    async fn list_projects(&self) -> Result<Vec<Project>, StoreError>;
    /// Lookup by id only. Used for existence checks, not for serving reads.
    async fn find_project(&self, id: DbId) -> Result<Option<Project>, StoreError>;
    async fn find_owned_project(
        &self,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<Project>, StoreError>;
    async fn update_owned_project(
        &self,
        id: DbId,
        owner_id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, StoreError>;
    async fn delete_owned_project(&self, id: DbId, owner_id: DbId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Fails with [`StoreError::MissingReference`] when the project (or the
    /// assignee) does not exist at write time.
    async fn create_task(&self, input: &NewTask) -> Result<Task, StoreError>;
    async fn find_task(&self, id: DbId) -> Result<Option<Task>, StoreError>;
    async fn list_tasks_by_project(&self, project_id: DbId) -> Result<Vec<Task>, StoreError>;
    async fn list_tasks_by_creator(&self, user_id: DbId) -> Result<Vec<Task>, StoreError>;
    async fn update_task(&self, id: DbId, patch: &TaskPatch) -> Result<Option<Task>, StoreError>;
    async fn delete_task(&self, id: DbId) -> Result<bool, StoreError>;
    /// Idempotent: deleting from a project with no tasks returns `Ok(0)`.
    async fn delete_tasks_by_project(&self, project_id: DbId) -> Result<u64, StoreError>;
}

/// The full backing store.
#[async_trait]
pub trait Store: UserStore + ProjectStore + TaskStore {
    /// Cheap reachability check for `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// [`Store`] backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Turn unique violations into [`StoreError::Duplicate`]; everything else
/// stays a database error.
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            return StoreError::Duplicate(constraint);
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, input: &CreateUser) -> Result<User, StoreError> {
        UserRepo::create(&self.pool, input).await.map_err(classify)
    }

    async fn find_user(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_email(&self.pool, email).await?)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(UserRepo::list(&self.pool).await?)
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn create_project(
        &self,
        owner_id: DbId,
        input: &CreateProject,
    ) -> Result<Project, StoreError> {
        Ok(ProjectRepo::create(&self.pool, owner_id, input).await?)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(ProjectRepo::list(&self.pool).await?)
    }

    async fn find_project(&self, id: DbId) -> Result<Option<Project>, StoreError> {
        Ok(ProjectRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_owned_project(
        &self,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<Project>, StoreError> {
        Ok(ProjectRepo::find_owned(&self.pool, id, owner_id).await?)
    }

    async fn update_owned_project(
        &self,
        id: DbId,
        owner_id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, StoreError> {
        Ok(ProjectRepo::update_owned(&self.pool, id, owner_id, input).await?)
    }

    async fn delete_owned_project(&self, id: DbId, owner_id: DbId) -> Result<bool, StoreError> {
        Ok(ProjectRepo::delete_owned(&self.pool, id, owner_id).await?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_task(&self, input: &NewTask) -> Result<Task, StoreError> {
        TaskRepo::create(&self.pool, input).await.map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err {
                if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) {
                    match db_err.constraint() {
                        Some("fk_tasks_project") => {
                            return StoreError::MissingReference {
                                entity: "Project",
                                id: input.project_id,
                            };
                        }
                        Some("fk_tasks_assignee") => {
                            return StoreError::MissingReference {
                                entity: "User",
                                id: input.assignee_id.unwrap_or_default(),
                            };
                        }
                        _ => {}
                    }
                }
            }
            classify(err)
        })
    }

    async fn find_task(&self, id: DbId) -> Result<Option<Task>, StoreError> {
        Ok(TaskRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_tasks_by_project(&self, project_id: DbId) -> Result<Vec<Task>, StoreError> {
        Ok(TaskRepo::list_by_project(&self.pool, project_id).await?)
    }

    async fn list_tasks_by_creator(&self, user_id: DbId) -> Result<Vec<Task>, StoreError> {
        Ok(TaskRepo::list_by_creator(&self.pool, user_id).await?)
    }

    async fn update_task(&self, id: DbId, patch: &TaskPatch) -> Result<Option<Task>, StoreError> {
        TaskRepo::update(&self.pool, id, patch).await.map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err {
                if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION)
                    && db_err.constraint() == Some("fk_tasks_assignee")
                {
                    return StoreError::MissingReference {
                        entity: "User",
                        id: patch.assignee_id.unwrap_or_default(),
                    };
                }
            }
            classify(err)
        })
    }

    async fn delete_task(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(TaskRepo::delete(&self.pool, id).await?)
    }

    async fn delete_tasks_by_project(&self, project_id: DbId) -> Result<u64, StoreError> {
        Ok(TaskRepo::delete_by_project(&self.pool, project_id).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
