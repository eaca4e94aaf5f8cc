/// Project model and database operations
///
/// A project is owned by exactly one manager and has a set of developer
/// members stored in the `project_developers` association table.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id BIGSERIAL PRIMARY KEY,
///     name TEXT,
///     manager_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE project_developers (
///     project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

/// Project with its manager and developer set resolved
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: i64,

    /// Optional display name
    pub name: Option<String>,

    /// Owning manager's user ID
    #[serde(rename = "manager")]
    pub manager_id: i64,

    /// Owning manager's username (read-only)
    pub manager_name: String,

    /// Developer member IDs, ascending
    pub developers: Vec<i64>,

    /// When the project was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone)]
pub struct CreateProject {
    /// Optional display name
    pub name: Option<String>,

    /// Owning manager
    pub manager_id: i64,

    /// Initial developer members (deduplicated by the caller)
    pub developers: Vec<i64>,
}

const SELECT_PROJECT: &str = r#"
    SELECT p.id, p.name, p.manager_id, u.username AS manager_name,
           ARRAY(
               SELECT d.user_id FROM project_developers d
               WHERE d.project_id = p.id
               ORDER BY d.user_id
           ) AS developers,
           p.created_at
    FROM projects p
    JOIN users u ON u.id = p.manager_id
"#;

impl Project {
    /// Whether `user_id` is in the developer set
    pub fn has_developer(&self, user_id: i64) -> bool {
        self.developers.contains(&user_id)
    }

    /// Creates a project and its developer rows in one transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the manager or a developer does not exist
    /// (foreign key violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO projects (name, manager_id)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(data.name)
        .bind(data.manager_id)
        .fetch_one(&mut *tx)
        .await?;

        if !data.developers.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO project_developers (project_id, user_id)
                SELECT $1, UNNEST($2::BIGINT[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id)
            .bind(&data.developers)
            .execute(&mut *tx)
            .await?;
        }

        let project = sqlx::query_as::<_, Project>(&format!("{SELECT_PROJECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!("{SELECT_PROJECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(project)
    }

    /// Adds a developer to a project
    ///
    /// Returns `false` when the user already was a developer.
    pub async fn add_developer(
        pool: &PgPool,
        project_id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO project_developers (project_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
