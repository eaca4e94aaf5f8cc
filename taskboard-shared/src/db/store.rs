/// Persistence port for users, projects and tasks
///
/// Services talk to storage only through the [`Store`] trait so the
/// authorization rules can be exercised without a database. Two adapters
/// exist:
///
/// - [`PgStore`]: PostgreSQL, delegating to the `models` query functions
/// - [`MemoryStore`](super::memory::MemoryStore): in-process, for tests
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskboard_shared::db::store::{PgStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
///
/// println!("{} users", store.count_users().await?);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{
    project::{CreateProject, Project},
    task::{CreateTask, Task, UpdateTask},
    user::{CreateUser, User},
};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Duplicate value violates {0}")]
    Duplicate(String),

    /// A referenced row does not exist
    #[error("Missing referenced row: {0}")]
    MissingReference(String),

    /// In-memory state lock was poisoned by a panicking writer
    #[error("Store state is poisoned")]
    Poisoned,

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            if db_err.is_unique_violation() {
                return StoreError::Duplicate(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::MissingReference(constraint);
            }
        }
        StoreError::Database(err)
    }
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence contract used by the services
///
/// Association sets (`Project::developers`, `Task::assignee`) are always
/// returned sorted ascending and free of duplicates. Task listings are in
/// creation order.
#[async_trait]
pub trait Store: Send + Sync {
    /// Verifies the backing storage answers
    async fn ping(&self) -> StoreResult<()>;

    /// Stores a new user
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] when the username is taken.
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn count_users(&self) -> StoreResult<i64>;

    /// Returns the subset of `ids` naming existing users, ascending
    async fn existing_user_ids(&self, ids: &[i64]) -> StoreResult<Vec<i64>>;

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project>;

    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>>;

    /// Adds `user_id` to the project's developers; `false` if already present
    async fn add_project_developer(&self, project_id: i64, user_id: i64) -> StoreResult<bool>;

    /// Stores a task together with its assignee set, atomically
    async fn create_task(&self, data: CreateTask) -> StoreResult<Task>;

    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>>;

    /// Lists a project's tasks, optionally only those assigned to `assignee_id`
    async fn list_tasks(&self, project_id: i64, assignee_id: Option<i64>)
        -> StoreResult<Vec<Task>>;

    /// Applies a partial update atomically; `None` if the task doesn't exist
    async fn update_task(&self, id: i64, data: UpdateTask) -> StoreResult<Option<Task>>;
}

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool (for migrations and shutdown)
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        super::pool::health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn count_users(&self) -> StoreResult<i64> {
        Ok(User::count(&self.pool).await?)
    }

    async fn existing_user_ids(&self, ids: &[i64]) -> StoreResult<Vec<i64>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(User::existing_ids(&self.pool, ids).await?)
    }

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        Ok(Project::create(&self.pool, data).await?)
    }

    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_id(&self.pool, id).await?)
    }

    async fn add_project_developer(&self, project_id: i64, user_id: i64) -> StoreResult<bool> {
        Ok(Project::add_developer(&self.pool, project_id, user_id).await?)
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn list_tasks(
        &self,
        project_id: i64,
        assignee_id: Option<i64>,
    ) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_project(&self.pool, project_id, assignee_id).await?)
    }

    async fn update_task(&self, id: i64, data: UpdateTask) -> StoreResult<Option<Task>> {
        Ok(Task::update(&self.pool, id, data).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Duplicate("users_username_key".to_string());
        assert!(err.to_string().contains("users_username_key"));

        let err = StoreError::MissingReference("tasks_project_id_fkey".to_string());
        assert!(err.to_string().contains("tasks_project_id_fkey"));
    }

    #[test]
    fn test_non_database_sqlx_error_maps_to_database() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }
}
