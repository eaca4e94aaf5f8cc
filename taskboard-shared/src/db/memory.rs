//! In-memory store for tests and local experiments.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

use super::store::{Store, StoreError, StoreResult};
use crate::models::{
    project::{CreateProject, Project},
    task::{CreateTask, Task, UpdateTask},
    user::{CreateUser, User},
};

/// Thread-safe in-memory store
///
/// Mirrors the PostgreSQL adapter's observable behavior: sequential ids per
/// table, unique usernames, referential checks on insert, sorted association sets
/// and tasks listed in creation order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    user_ids: Sequence,
    project_ids: Sequence,
    task_ids: Sequence,
    users: BTreeMap<i64, User>,
    projects: BTreeMap<i64, ProjectRecord>,
    tasks: BTreeMap<i64, TaskRecord>,
}

#[derive(Debug, Clone)]
struct ProjectRecord {
    name: Option<String>,
    manager_id: i64,
    developers: BTreeSet<i64>,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct TaskRecord {
    task: Task,
    assignee: BTreeSet<i64>,
}

/// Id counter for one table, starting at 1
#[derive(Debug, Default)]
struct Sequence(i64);

impl Sequence {
    fn next_id(&mut self) -> i64 {
        self.0 += 1;
        self.0
    }
}

impl MemoryState {
    fn require_users(&self, ids: impl IntoIterator<Item = i64>, what: &str) -> StoreResult<()> {
        for id in ids {
            if !self.users.contains_key(&id) {
                return Err(StoreError::MissingReference(format!("{what} {id}")));
            }
        }
        Ok(())
    }

    fn project(&self, id: i64) -> Option<Project> {
        let record = self.projects.get(&id)?;
        let manager_name = self
            .users
            .get(&record.manager_id)
            .map(|u| u.username.clone())
            .unwrap_or_default();

        Some(Project {
            id,
            name: record.name.clone(),
            manager_id: record.manager_id,
            manager_name,
            developers: record.developers.iter().copied().collect(),
            created_at: record.created_at,
        })
    }
}

impl TaskRecord {
    fn snapshot(&self) -> Task {
        let mut task = self.task.clone();
        task.assignee = self.assignee.iter().copied().collect();
        task
    }
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&MemoryState) -> StoreResult<T>) -> StoreResult<T> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        f(&state)
    }

    fn write<T>(&self, f: impl FnOnce(&mut MemoryState) -> StoreResult<T>) -> StoreResult<T> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        f(&mut state)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.read(|_| Ok(()))
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        self.write(|state| {
            if state.users.values().any(|u| u.username == data.username) {
                return Err(StoreError::Duplicate("users_username_key".to_string()));
            }

            let user = User {
                id: state.user_ids.next_id(),
                username: data.username,
                password_hash: data.password_hash,
                user_role: data.user_role,
                created_at: Utc::now(),
            };
            state.users.insert(user.id, user.clone());
            Ok(user)
        })
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        self.read(|state| Ok(state.users.get(&id).cloned()))
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.read(|state| {
            Ok(state
                .users
                .values()
                .find(|u| u.username == username)
                .cloned())
        })
    }

    async fn count_users(&self) -> StoreResult<i64> {
        self.read(|state| Ok(state.users.len() as i64))
    }

    async fn existing_user_ids(&self, ids: &[i64]) -> StoreResult<Vec<i64>> {
        self.read(|state| {
            let found: BTreeSet<i64> = ids
                .iter()
                .copied()
                .filter(|id| state.users.contains_key(id))
                .collect();
            Ok(found.into_iter().collect())
        })
    }

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        self.write(|state| {
            state.require_users([data.manager_id], "manager")?;
            state.require_users(data.developers.iter().copied(), "developer")?;

            let id = state.project_ids.next_id();
            state.projects.insert(
                id,
                ProjectRecord {
                    name: data.name,
                    manager_id: data.manager_id,
                    developers: data.developers.into_iter().collect(),
                    created_at: Utc::now(),
                },
            );
            state
                .project(id)
                .ok_or_else(|| StoreError::MissingReference(format!("project {id}")))
        })
    }

    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>> {
        self.read(|state| Ok(state.project(id)))
    }

    async fn add_project_developer(&self, project_id: i64, user_id: i64) -> StoreResult<bool> {
        self.write(|state| {
            state.require_users([user_id], "developer")?;
            let record = state
                .projects
                .get_mut(&project_id)
                .ok_or_else(|| StoreError::MissingReference(format!("project {project_id}")))?;
            Ok(record.developers.insert(user_id))
        })
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        self.write(|state| {
            if !state.projects.contains_key(&data.project_id) {
                return Err(StoreError::MissingReference(format!(
                    "project {}",
                    data.project_id
                )));
            }
            state.require_users([data.creator_id], "creator")?;
            state.require_users(data.assignee.iter().copied(), "assignee")?;

            let now = Utc::now();
            let record = TaskRecord {
                task: Task {
                    id: state.task_ids.next_id(),
                    title: data.title,
                    description: data.description,
                    is_done: data.is_done,
                    project_id: data.project_id,
                    creator_id: data.creator_id,
                    assignee: Vec::new(),
                    created_at: now,
                    updated_at: now,
                },
                assignee: data.assignee.into_iter().collect(),
            };
            let task = record.snapshot();
            state.tasks.insert(task.id, record);
            Ok(task)
        })
    }

    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>> {
        self.read(|state| Ok(state.tasks.get(&id).map(TaskRecord::snapshot)))
    }

    async fn list_tasks(
        &self,
        project_id: i64,
        assignee_id: Option<i64>,
    ) -> StoreResult<Vec<Task>> {
        self.read(|state| {
            Ok(state
                .tasks
                .values()
                .filter(|r| r.task.project_id == project_id)
                .filter(|r| assignee_id.map_or(true, |a| r.assignee.contains(&a)))
                .map(TaskRecord::snapshot)
                .collect())
        })
    }

    async fn update_task(&self, id: i64, data: UpdateTask) -> StoreResult<Option<Task>> {
        self.write(|state| {
            if let Some(assignee) = &data.assignee {
                state.require_users(assignee.iter().copied(), "assignee")?;
            }

            let Some(record) = state.tasks.get_mut(&id) else {
                return Ok(None);
            };

            if let Some(title) = data.title {
                record.task.title = title;
            }
            if let Some(description) = data.description {
                record.task.description = description;
            }
            if let Some(is_done) = data.is_done {
                record.task.is_done = is_done;
            }
            if let Some(assignee) = data.assignee {
                record.assignee = assignee.into_iter().collect();
            }
            record.task.updated_at = Utc::now();

            Ok(Some(record.snapshot()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;

    async fn user(store: &MemoryStore, name: &str) -> User {
        store
            .create_user(CreateUser {
                username: name.to_string(),
                password_hash: "test_hash".to_string(),
                user_role: UserRole::Developer,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_ids_are_sequential_per_table() {
        let store = MemoryStore::new();
        let manager = user(&store, "manager-1").await;
        let developer = user(&store, "developer-1").await;
        assert_eq!((manager.id, developer.id), (1, 2));

        let project = store
            .create_project(CreateProject {
                name: None,
                manager_id: manager.id,
                developers: vec![developer.id],
            })
            .await
            .unwrap();
        assert_eq!(project.id, 1);

        for expected in 1..=2 {
            let task = store
                .create_task(CreateTask {
                    project_id: project.id,
                    creator_id: manager.id,
                    title: format!("task-{expected}"),
                    description: None,
                    is_done: false,
                    assignee: vec![],
                })
                .await
                .unwrap();
            assert_eq!(task.id, expected);
        }

        assert_eq!(user(&store, "developer-2").await.id, 3);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = MemoryStore::new();
        user(&store, "developer-1").await;

        let result = store
            .create_user(CreateUser {
                username: "developer-1".to_string(),
                password_hash: "other".to_string(),
                user_role: UserRole::Manager,
            })
            .await;

        assert!(matches!(result, Err(StoreError::Duplicate(_))));
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_project_developers_are_sorted_and_unique() {
        let store = MemoryStore::new();
        let manager = user(&store, "manager-1").await;
        let dev_a = user(&store, "developer-1").await;
        let dev_b = user(&store, "developer-2").await;

        let project = store
            .create_project(CreateProject {
                name: Some("proj-11".to_string()),
                manager_id: manager.id,
                developers: vec![dev_b.id, dev_a.id, dev_b.id],
            })
            .await
            .unwrap();

        assert_eq!(project.developers, vec![dev_a.id, dev_b.id]);
        assert_eq!(project.manager_name, "manager-1");

        assert!(!store.add_project_developer(project.id, dev_a.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_task_with_unknown_assignee_persists_nothing() {
        let store = MemoryStore::new();
        let manager = user(&store, "manager-1").await;
        let project = store
            .create_project(CreateProject {
                name: None,
                manager_id: manager.id,
                developers: vec![],
            })
            .await
            .unwrap();

        let result = store
            .create_task(CreateTask {
                project_id: project.id,
                creator_id: manager.id,
                title: "t".to_string(),
                description: None,
                is_done: false,
                assignee: vec![999],
            })
            .await;

        assert!(matches!(result, Err(StoreError::MissingReference(_))));
        assert!(store.list_tasks(project.id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_tasks_filters_by_assignee_in_creation_order() {
        let store = MemoryStore::new();
        let manager = user(&store, "manager-1").await;
        let dev = user(&store, "developer-1").await;
        let project = store
            .create_project(CreateProject {
                name: None,
                manager_id: manager.id,
                developers: vec![dev.id],
            })
            .await
            .unwrap();

        let mut ids = Vec::new();
        for (title, assignee) in [("a", vec![dev.id]), ("b", vec![]), ("c", vec![dev.id])] {
            let task = store
                .create_task(CreateTask {
                    project_id: project.id,
                    creator_id: manager.id,
                    title: title.to_string(),
                    description: None,
                    is_done: false,
                    assignee,
                })
                .await
                .unwrap();
            ids.push(task.id);
        }

        let all: Vec<i64> = store
            .list_tasks(project.id, None)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(all, ids);

        let assigned: Vec<i64> = store
            .list_tasks(project.id, Some(dev.id))
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(assigned, vec![ids[0], ids[2]]);
    }

    #[tokio::test]
    async fn test_update_missing_task_returns_none() {
        let store = MemoryStore::new();
        let result = store.update_task(42, UpdateTask::default()).await.unwrap();
        assert!(result.is_none());
    }
}
