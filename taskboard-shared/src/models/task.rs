/// Task model and database operations
///
/// A task belongs to exactly one project (deleted with it), records the user
/// who created it, and carries a set of assignees stored in the
/// `task_assignees` association table.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(200) NOT NULL DEFAULT 'Task title',
///     description TEXT,
///     is_done BOOLEAN NOT NULL DEFAULT FALSE,
///     project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     creator_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE task_assignees (
///     task_id BIGINT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     PRIMARY KEY (task_id, user_id)
/// );
/// ```
///
/// The model does not check that assignees are project developers; callers
/// go through `service::tasks`, which does.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};

/// Title used when a task is created without one
pub const DEFAULT_TASK_TITLE: &str = "Task title";

/// Maximum title length in characters
pub const MAX_TITLE_LENGTH: u64 = 200;

/// Task with its assignee set resolved
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: i64,

    /// Short title
    pub title: String,

    /// Optional long description
    pub description: Option<String>,

    /// Completion flag
    pub is_done: bool,

    /// Owning project
    #[serde(rename = "project")]
    pub project_id: i64,

    /// User who created the task
    #[serde(rename = "creator")]
    pub creator_id: i64,

    /// Assigned user IDs, ascending
    pub assignee: Vec<i64>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub project_id: i64,
    pub creator_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_done: bool,
    /// Deduplicated, ascending
    pub assignee: Vec<i64>,
}

/// Input for updating an existing task
///
/// Only non-None fields are updated. `project_id` and `creator_id` cannot
/// change.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description (use Some(None) to clear)
    pub description: Option<Option<String>>,

    /// New completion flag
    pub is_done: Option<bool>,

    /// Replacement assignee set
    pub assignee: Option<Vec<i64>>,
}

impl UpdateTask {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.is_done.is_none()
            && self.assignee.is_none()
    }
}

const SELECT_TASK: &str = r#"
    SELECT t.id, t.title, t.description, t.is_done, t.project_id, t.creator_id,
           ARRAY(
               SELECT a.user_id FROM task_assignees a
               WHERE a.task_id = t.id
               ORDER BY a.user_id
           ) AS assignee,
           t.created_at, t.updated_at
    FROM tasks t
"#;

impl Task {
    /// Whether `user_id` is one of the assignees
    pub fn has_assignee(&self, user_id: i64) -> bool {
        self.assignee.contains(&user_id)
    }

    /// Creates a task and its assignee rows in one transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the project, creator or an assignee does not exist
    /// (foreign key violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO tasks (title, description, is_done, project_id, creator_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.is_done)
        .bind(data.project_id)
        .bind(data.creator_id)
        .fetch_one(&mut *tx)
        .await?;

        replace_assignees(&mut tx, id, &data.assignee).await?;

        let task = sqlx::query_as::<_, Task>(&format!("{SELECT_TASK} WHERE t.id = $1"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!("{SELECT_TASK} WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Lists a project's tasks in creation order
    ///
    /// When `assignee_id` is given, only tasks assigned to that user are returned.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: i64,
        assignee_id: Option<i64>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"{SELECT_TASK}
            WHERE t.project_id = $1
              AND ($2::BIGINT IS NULL OR EXISTS (
                  SELECT 1 FROM task_assignees a
                  WHERE a.task_id = t.id AND a.user_id = $2
              ))
            ORDER BY t.id"#
        ))
        .bind(project_id)
        .bind(assignee_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates an existing task
    ///
    /// Scalar fields and the assignee set are written in one transaction. The
    /// `updated_at` timestamp is always bumped.
    ///
    /// # Returns
    ///
    /// The updated task if found, None if the task doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.is_done.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_done = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1");

        let mut q = sqlx::query(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(is_done) = data.is_done {
            q = q.bind(is_done);
        }

        let result = q.execute(&mut *tx).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        if let Some(assignee) = data.assignee {
            sqlx::query("DELETE FROM task_assignees WHERE task_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            replace_assignees(&mut tx, id, &assignee).await?;
        }

        let task = sqlx::query_as::<_, Task>(&format!("{SELECT_TASK} WHERE t.id = $1"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(task))
    }
}

/// Inserts assignee rows for a task, skipping ones already present
async fn replace_assignees(
    tx: &mut Transaction<'_, Postgres>,
    task_id: i64,
    assignee: &[i64],
) -> Result<(), sqlx::Error> {
    if assignee.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO task_assignees (task_id, user_id)
        SELECT $1, UNNEST($2::BIGINT[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(task_id)
    .bind(assignee)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_task_default_is_empty() {
        let update = UpdateTask::default();
        assert!(update.is_empty());
        assert!(update.title.is_none());
        assert!(update.description.is_none());
        assert!(update.is_done.is_none());
        assert!(update.assignee.is_none());
    }

    #[test]
    fn test_update_task_with_cleared_description_is_not_empty() {
        let update = UpdateTask {
            description: Some(None),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_task_serialization_uses_relation_names() {
        let task = Task {
            id: 12,
            title: "task-12".to_string(),
            description: None,
            is_done: false,
            project_id: 11,
            creator_id: 1,
            assignee: vec![3],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["project"], 11);
        assert_eq!(json["creator"], 1);
        assert_eq!(json["assignee"], serde_json::json!([3]));
        assert!(json["description"].is_null());
        assert!(task.has_assignee(3));
        assert!(!task.has_assignee(4));
    }
}
