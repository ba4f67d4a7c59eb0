//! Project deletion and the task sweep that follows it.
//!
//! The two steps are not transactional. The project row goes first; only when
//! its removal is confirmed are the project's tasks swept. A failed sweep is
//! reported, never swallowed, and re-running the deletion finishes the job:
//! once the project row is gone, any tasks still pointing at it are removed
//! before the call reports [`CascadeError::ProjectNotFound`].

use taskflow_core::types::DbId;

use crate::store::{ProjectStore, StoreError, TaskStore};

#[derive(Debug, thiserror::Error)]
pub enum CascadeError {
    /// No project with this id is owned by the caller. Covers both "never
    /// existed" and "owned by someone else".
    #[error("Project with id {0} not found")]
    ProjectNotFound(DbId),

    /// The project was deleted but its tasks could not be removed.
    #[error("Project {project_id} deleted but its tasks could not be removed: {source}")]
    TaskSweep {
        project_id: DbId,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Delete an owned project and every task that references it.
///
/// Returns the number of tasks the sweep removed. A backend whose schema
/// already cascades (PostgreSQL's `fk_tasks_project`) reports zero.
pub async fn delete_project<S>(store: &S, project_id: DbId, owner_id: DbId) -> Result<u64, CascadeError>
where
    S: ProjectStore + TaskStore + ?Sized,
{
    if !store.delete_owned_project(project_id, owner_id).await? {
        // Someone else's live project keeps its tasks. A missing project may
        // have left tasks behind from an interrupted earlier attempt.
        if store.find_project(project_id).await?.is_none() {
            let leftover = sweep(store, project_id).await?;
            if leftover > 0 {
                tracing::warn!(project_id, leftover, "Removed tasks left by an earlier project deletion");
            }
        }
        return Err(CascadeError::ProjectNotFound(project_id));
    }

    let removed = sweep(store, project_id).await?;
    tracing::info!(project_id, owner_id, tasks_swept = removed, "Project deleted");
    Ok(removed)
}

async fn sweep<S>(store: &S, project_id: DbId) -> Result<u64, CascadeError>
where
    S: TaskStore + ?Sized,
{
    store
        .delete_tasks_by_project(project_id)
        .await
        .map_err(|source| {
            tracing::error!(project_id, error = %source, "Task sweep after project deletion failed");
            CascadeError::TaskSweep { project_id, source }
        })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::Utc;
    use taskflow_core::lifecycle::Completion;
    use taskflow_core::task_status::TaskStatus;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::models::project::{CreateProject, Project, UpdateProject};
    use crate::models::task::{NewTask, Task, TaskPatch};

    /// Wraps a [`MemoryStore`] and fails `delete_tasks_by_project` while the
    /// flag is set.
    struct FlakySweep {
        inner: MemoryStore,
        fail_sweep: AtomicBool,
    }

    #[async_trait]
    impl ProjectStore for FlakySweep {
        async fn create_project(&self, owner_id: DbId, input: &CreateProject) -> Result<Project, StoreError> {
            self.inner.create_project(owner_id, input).await
        }
        async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
            self.inner.list_projects().await
        }
        async fn find_project(&self, id: DbId) -> Result<Option<Project>, StoreError> {
            self.inner.find_project(id).await
        }
        async fn find_owned_project(&self, id: DbId, owner_id: DbId) -> Result<Option<Project>, StoreError> {
            self.inner.find_owned_project(id, owner_id).await
        }
        async fn update_owned_project(
            &self,
            id: DbId,
            owner_id: DbId,
            input: &UpdateProject,
        ) -> Result<Option<Project>, StoreError> {
            self.inner.update_owned_project(id, owner_id, input).await
        }
        async fn delete_owned_project(&self, id: DbId, owner_id: DbId) -> Result<bool, StoreError> {
            self.inner.delete_owned_project(id, owner_id).await
        }
    }

    #[async_trait]
    impl TaskStore for FlakySweep {
        async fn create_task(&self, input: &NewTask) -> Result<Task, StoreError> {
            self.inner.create_task(input).await
        }
        async fn find_task(&self, id: DbId) -> Result<Option<Task>, StoreError> {
            self.inner.find_task(id).await
        }
        async fn list_tasks_by_project(&self, project_id: DbId) -> Result<Vec<Task>, StoreError> {
            self.inner.list_tasks_by_project(project_id).await
        }
        async fn list_tasks_by_creator(&self, user_id: DbId) -> Result<Vec<Task>, StoreError> {
            self.inner.list_tasks_by_creator(user_id).await
        }
        async fn update_task(&self, id: DbId, patch: &TaskPatch) -> Result<Option<Task>, StoreError> {
            self.inner.update_task(id, patch).await
        }
        async fn delete_task(&self, id: DbId) -> Result<bool, StoreError> {
            self.inner.delete_task(id).await
        }
        async fn delete_tasks_by_project(&self, project_id: DbId) -> Result<u64, StoreError> {
            if self.fail_sweep.load(Ordering::SeqCst) {
                return Err(StoreError::Backend("connection reset".into()));
            }
            self.inner.delete_tasks_by_project(project_id).await
        }
    }

    async fn seed<S: ProjectStore + TaskStore + ?Sized>(store: &S, owner_id: DbId, tasks: usize) -> DbId {
        let project = store
            .create_project(
                owner_id,
                &CreateProject {
                    title: "Website Revamp".into(),
                    description: None,
                },
            )
            .await
            .unwrap();
        for i in 0..tasks {
            store
                .create_task(&NewTask {
                    title: format!("task {i}"),
                    description: None,
                    completion: Completion::initial(TaskStatus::ToDo, Utc::now()),
                    project_id: project.id,
                    created_by: owner_id,
                    assignee_id: None,
                })
                .await
                .unwrap();
        }
        project.id
    }

    #[tokio::test]
    async fn deletes_project_then_all_its_tasks() {
        let store = MemoryStore::new();
        let project_id = seed(&store, 1, 3).await;
        let untouched = seed(&store, 1, 2).await;

        assert_eq!(delete_project(&store, project_id, 1).await.unwrap(), 3);
        assert!(store.find_project(project_id).await.unwrap().is_none());
        assert!(store.list_tasks_by_project(project_id).await.unwrap().is_empty());
        assert_eq!(store.list_tasks_by_project(untouched).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn second_delete_reports_not_found() {
        let store = MemoryStore::new();
        let project_id = seed(&store, 1, 1).await;
        delete_project(&store, project_id, 1).await.unwrap();

        assert_matches!(
            delete_project(&store, project_id, 1).await,
            Err(CascadeError::ProjectNotFound(id)) if id == project_id
        );
    }

    #[tokio::test]
    async fn non_owner_cannot_delete_and_tasks_survive() {
        let store = MemoryStore::new();
        let project_id = seed(&store, 1, 2).await;

        assert_matches!(
            delete_project(&store, project_id, 2).await,
            Err(CascadeError::ProjectNotFound(_))
        );
        assert!(store.find_project(project_id).await.unwrap().is_some());
        assert_eq!(store.list_tasks_by_project(project_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failed_sweep_surfaces_and_retry_cleans_up() {
        let store = FlakySweep {
            inner: MemoryStore::new(),
            fail_sweep: AtomicBool::new(true),
        };
        let project_id = seed(&store, 1, 4).await;

        assert_matches!(
            delete_project(&store, project_id, 1).await,
            Err(CascadeError::TaskSweep { project_id: id, .. }) if id == project_id
        );
        assert!(store.find_project(project_id).await.unwrap().is_none());
        assert_eq!(store.list_tasks_by_project(project_id).await.unwrap().len(), 4);

        store.fail_sweep.store(false, Ordering::SeqCst);
        assert_matches!(
            delete_project(&store, project_id, 1).await,
            Err(CascadeError::ProjectNotFound(_))
        );
        assert!(store.list_tasks_by_project(project_id).await.unwrap().is_empty());
    }
}
