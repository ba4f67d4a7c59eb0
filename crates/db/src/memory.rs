//! In-process [`Store`] for tests and local development.
//!
//! Mirrors the PostgreSQL schema's guarantees (unique emails, per-table
//! ascending ids, foreign-key checks on task writes) except that deleting a
//! project does not touch its tasks; [`crate::cascade`] sweeps them.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use taskflow_core::types::DbId;

use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::task::{NewTask, Task, TaskPatch};
use crate::models::user::{CreateUser, User};
use crate::store::{ProjectStore, Store, StoreError, TaskStore, UserStore};

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<DbId, T>,
    last_id: DbId,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Debug, Default)]
struct State {
    users: Table<User>,
    projects: Table<Project>,
    tasks: Table<Task>,
}

/// In-memory store. Every operation takes one lock, so each call is atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }
}

fn ensure_user(state: &State, id: Option<DbId>) -> Result<(), StoreError> {
    match id {
        Some(id) if !state.users.rows.contains_key(&id) => {
            Err(StoreError::MissingReference { entity: "User", id })
        }
        _ => Ok(()),
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, input: &CreateUser) -> Result<User, StoreError> {
        let mut state = self.write()?;
        if state.users.rows.values().any(|u| u.email == input.email) {
            return Err(StoreError::Duplicate("uq_users_email".into()));
        }
        let id = state.users.next_id();
        let user = User {
            id,
            email: input.email.clone(),
            name: input.name.clone(),
            password_hash: input.password_hash.clone(),
            role: input.role,
            created_at: Utc::now(),
        };
        state.users.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.rows.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .users
            .rows
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.read()?.users.rows.values().cloned().collect())
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn create_project(
        &self,
        owner_id: DbId,
        input: &CreateProject,
    ) -> Result<Project, StoreError> {
        let mut state = self.write()?;
        let id = state.projects.next_id();
        let project = Project {
            id,
            title: input.title.clone(),
            description: input.description.clone(),
            owner_id,
            created_at: Utc::now(),
        };
        state.projects.rows.insert(id, project.clone());
        Ok(project)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.read()?.projects.rows.values().cloned().collect())
    }

    async fn find_project(&self, id: DbId) -> Result<Option<Project>, StoreError> {
        Ok(self.read()?.projects.rows.get(&id).cloned())
    }

    async fn find_owned_project(
        &self,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<Project>, StoreError> {
        Ok(self
            .read()?
            .projects
            .rows
            .get(&id)
            .filter(|p| p.owner_id == owner_id)
            .cloned())
    }

    async fn update_owned_project(
        &self,
        id: DbId,
        owner_id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, StoreError> {
        let mut state = self.write()?;
        let Some(project) = state
            .projects
            .rows
            .get_mut(&id)
            .filter(|p| p.owner_id == owner_id)
        else {
            return Ok(None);
        };
        project.title = input.title.clone();
        if let Some(description) = &input.description {
            project.description = Some(description.clone());
        }
        Ok(Some(project.clone()))
    }

    async fn delete_owned_project(&self, id: DbId, owner_id: DbId) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        let owned = state
            .projects
            .rows
            .get(&id)
            .is_some_and(|p| p.owner_id == owner_id);
        if owned {
            state.projects.rows.remove(&id);
        }
        Ok(owned)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(&self, input: &NewTask) -> Result<Task, StoreError> {
        let mut state = self.write()?;
        if !state.projects.rows.contains_key(&input.project_id) {
            return Err(StoreError::MissingReference {
                entity: "Project",
                id: input.project_id,
            });
        }
        ensure_user(&state, input.assignee_id)?;
        let id = state.tasks.next_id();
        let task = Task {
            id,
            title: input.title.clone(),
            description: input.description.clone(),
            status: input.completion.status,
            project_id: input.project_id,
            created_by: input.created_by,
            assignee_id: input.assignee_id,
            created_at: Utc::now(),
            completed_at: input.completion.completed_at,
        };
        state.tasks.rows.insert(id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: DbId) -> Result<Option<Task>, StoreError> {
        Ok(self.read()?.tasks.rows.get(&id).cloned())
    }

    async fn list_tasks_by_project(&self, project_id: DbId) -> Result<Vec<Task>, StoreError> {
        Ok(self
            .read()?
            .tasks
            .rows
            .values()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn list_tasks_by_creator(&self, user_id: DbId) -> Result<Vec<Task>, StoreError> {
        Ok(self
            .read()?
            .tasks
            .rows
            .values()
            .filter(|t| t.created_by == user_id)
            .cloned()
            .collect())
    }

    async fn update_task(&self, id: DbId, patch: &TaskPatch) -> Result<Option<Task>, StoreError> {
        let mut state = self.write()?;
        ensure_user(&state, patch.assignee_id)?;
        let Some(task) = state.tasks.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(description) = &patch.description {
            task.description = Some(description.clone());
        }
        if let Some(assignee_id) = patch.assignee_id {
            task.assignee_id = Some(assignee_id);
        }
        if let Some(completion) = patch.completion {
            task.status = completion.status;
            task.completed_at = completion.completed_at;
        }
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(self.write()?.tasks.rows.remove(&id).is_some())
    }

    async fn delete_tasks_by_project(&self, project_id: DbId) -> Result<u64, StoreError> {
        let mut state = self.write()?;
        let before = state.tasks.rows.len();
        state.tasks.rows.retain(|_, t| t.project_id != project_id);
        Ok((before - state.tasks.rows.len()) as u64)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.read().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use taskflow_core::lifecycle::Completion;
    use taskflow_core::roles::Role;
    use taskflow_core::task_status::TaskStatus;

    use super::*;

    fn new_user(email: &str, role: Role) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            name: "Test".to_string(),
            password_hash: "hash".to_string(),
            role,
        }
    }

    fn new_task(project_id: DbId, created_by: DbId) -> NewTask {
        NewTask {
            title: "Write tests".to_string(),
            description: None,
            completion: Completion::initial(TaskStatus::ToDo, Utc::now()),
            project_id,
            created_by,
            assignee_id: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store.create_user(&new_user("a@x.io", Role::User)).await.unwrap();
        let err = store
            .create_user(&new_user("a@x.io", Role::Manager))
            .await
            .unwrap_err();
        assert_matches!(err, StoreError::Duplicate(c) if c == "uq_users_email");
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn email_match_is_case_sensitive() {
        let store = MemoryStore::new();
        store.create_user(&new_user("a@x.io", Role::User)).await.unwrap();
        assert!(store.create_user(&new_user("A@x.io", Role::User)).await.is_ok());
        assert!(store.find_user_by_email("A@X.IO").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn owner_scoping_applies_to_single_record_operations() {
        let store = MemoryStore::new();
        let input = CreateProject {
            title: "Alpha".into(),
            description: None,
        };
        let project = store.create_project(1, &input).await.unwrap();

        assert!(store.find_owned_project(project.id, 2).await.unwrap().is_none());
        assert!(store.find_owned_project(project.id, 1).await.unwrap().is_some());
        assert!(store.find_project(project.id).await.unwrap().is_some());

        let update = UpdateProject {
            title: "Beta".into(),
            description: None,
        };
        assert!(store
            .update_owned_project(project.id, 2, &update)
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete_owned_project(project.id, 2).await.unwrap());
        assert_eq!(store.list_projects().await.unwrap().len(), 1);

        let updated = store
            .update_owned_project(project.id, 1, &update)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Beta");
        assert!(store.delete_owned_project(project.id, 1).await.unwrap());
        assert!(store.list_projects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_keeps_description_when_omitted() {
        let store = MemoryStore::new();
        let input = CreateProject {
            title: "Alpha".into(),
            description: Some("first".into()),
        };
        let project = store.create_project(1, &input).await.unwrap();
        let update = UpdateProject {
            title: "Alpha 2".into(),
            description: None,
        };
        let updated = store
            .update_owned_project(project.id, 1, &update)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.description.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn task_needs_an_existing_project_and_assignee() {
        let store = MemoryStore::new();
        assert_matches!(
            store.create_task(&new_task(42, 1)).await,
            Err(StoreError::MissingReference { entity: "Project", id: 42 })
        );

        let project = store
            .create_project(1, &CreateProject { title: "P".into(), description: None })
            .await
            .unwrap();
        let mut input = new_task(project.id, 1);
        input.assignee_id = Some(99);
        assert_matches!(
            store.create_task(&input).await,
            Err(StoreError::MissingReference { entity: "User", id: 99 })
        );
    }

    #[tokio::test]
    async fn delete_tasks_by_project_is_idempotent() {
        let store = MemoryStore::new();
        let project = store
            .create_project(1, &CreateProject { title: "P".into(), description: None })
            .await
            .unwrap();
        let other = store
            .create_project(1, &CreateProject { title: "Q".into(), description: None })
            .await
            .unwrap();
        store.create_task(&new_task(project.id, 1)).await.unwrap();
        store.create_task(&new_task(project.id, 1)).await.unwrap();
        let keep = store.create_task(&new_task(other.id, 1)).await.unwrap();

        assert_eq!(store.delete_tasks_by_project(project.id).await.unwrap(), 2);
        assert_eq!(store.delete_tasks_by_project(project.id).await.unwrap(), 0);
        assert!(store.find_task(keep.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn patch_without_completion_keeps_stored_status() {
        let store = MemoryStore::new();
        let project = store
            .create_project(1, &CreateProject { title: "P".into(), description: None })
            .await
            .unwrap();
        let task = store.create_task(&new_task(project.id, 1)).await.unwrap();

        // A status change lands after another writer read the task as "To Do".
        let done = store
            .update_task(
                task.id,
                &TaskPatch::status_only(task.completion().transition(TaskStatus::Completed, Utc::now())),
            )
            .await
            .unwrap()
            .unwrap();

        let renamed = store
            .update_task(
                task.id,
                &TaskPatch {
                    title: Some("Renamed".into()),
                    ..TaskPatch::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.title, "Renamed");
        assert_eq!(renamed.status, TaskStatus::Completed);
        assert_eq!(renamed.completed_at, done.completed_at);
    }

    #[tokio::test]
    async fn update_of_missing_task_returns_none() {
        let store = MemoryStore::new();
        let patch = TaskPatch::status_only(Completion::initial(TaskStatus::Doing, Utc::now()));
        assert!(store.update_task(5, &patch).await.unwrap().is_none());
    }
}
