/// User model and database operations
///
/// Users sign up with a username, a password and an informational role.
/// Authority over projects and tasks never comes from the role; it is derived
/// from the project relations (see `auth::authorization`).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('developer', 'manager');
///
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     username VARCHAR(150) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     user_role user_role NOT NULL DEFAULT 'manager',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{CreateUser, User, UserRole};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     username: "developer-1".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     user_role: UserRole::Developer,
/// }).await?;
///
/// let found = User::find_by_username(&pool, "developer-1").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Role a user declares at signup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Works on project tasks
    Developer,

    /// Owns projects
    #[default]
    Manager,
}

impl UserRole {
    /// Converts role to its wire/database name
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Developer => "developer",
            UserRole::Manager => "manager",
        }
    }

    /// Parses a role name, returning `None` for anything but the two known roles
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "developer" => Some(UserRole::Developer),
            "manager" => Some(UserRole::Manager),
            _ => None,
        }
    }
}

/// User model representing an account
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Login name, unique across all users
    pub username: String,

    /// Argon2id password hash, never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Declared role (informational)
    pub user_role: UserRole,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Login name
    pub username: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    /// Declared role
    pub user_role: UserRole,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the username is already taken (unique constraint
    /// violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, user_role)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, user_role, created_at
            "#,
        )
        .bind(data.username)
        .bind(data.password_hash)
        .bind(data.user_role)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, user_role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username (exact match)
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, user_role, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Returns the subset of `ids` that name existing users, sorted ascending
    pub async fn existing_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
        let found: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM users
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(found)
    }

    /// Counts total number of users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_parse() {
        assert_eq!(UserRole::parse("developer"), Some(UserRole::Developer));
        assert_eq!(UserRole::parse("manager"), Some(UserRole::Manager));
        assert_eq!(UserRole::parse("wrong"), None);
        assert_eq!(UserRole::parse("Manager"), None);
    }

    #[test]
    fn test_user_role_default_is_manager() {
        assert_eq!(UserRole::default(), UserRole::Manager);
        assert_eq!(UserRole::default().as_str(), "manager");
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = User {
            id: 7,
            username: "developer-1".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            user_role: UserRole::Developer,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["username"], "developer-1");
        assert_eq!(json["user_role"], "developer");
        assert!(json.get("password_hash").is_none());
    }
}
