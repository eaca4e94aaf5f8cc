//! Common test utilities for API integration tests
//!
//! Builds the real router over a [`MemoryStore`] seeded with:
//!
//! ```text
//! manager-1
//! ├── proj-11  developers [developer-1, developer-2]
//! │   ├── task-11  assignee [developer-1]
//! │   └── task-12
//! └── proj-12  developers [developer-3]
//! manager-2   (no projects)
//! ```
//!
//! Seeded users carry a placeholder password hash; tests that log in create
//! their own account through signup.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use taskboard_shared::auth::jwt::{create_token, Claims, TokenType};
use taskboard_shared::db::{MemoryStore, Store};
use taskboard_shared::models::project::CreateProject;
use taskboard_shared::models::task::CreateTask;
use taskboard_shared::models::user::{CreateUser, User, UserRole};
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing the router and the seeded entities
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: Router,
    pub manager_1: User,
    pub manager_2: User,
    pub developer_1: User,
    pub developer_2: User,
    pub developer_3: User,
    pub proj_11: i64,
    pub proj_12: i64,
    pub task_11: i64,
    pub task_12: i64,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
        },
    }
}

async fn seed_user(store: &MemoryStore, username: &str, role: UserRole) -> anyhow::Result<User> {
    Ok(store
        .create_user(CreateUser {
            username: username.to_string(),
            password_hash: "test_hash".to_string(),
            user_role: role,
        })
        .await?)
}

async fn seed_task(
    store: &MemoryStore,
    project_id: i64,
    creator_id: i64,
    title: &str,
    assignee: Vec<i64>,
) -> anyhow::Result<i64> {
    Ok(store
        .create_task(CreateTask {
            project_id,
            creator_id,
            title: title.to_string(),
            description: None,
            is_done: false,
            assignee,
        })
        .await?
        .id)
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        let store = Arc::new(MemoryStore::new());

        let manager_1 = seed_user(&store, "manager-1", UserRole::Manager).await?;
        let manager_2 = seed_user(&store, "manager-2", UserRole::Manager).await?;
        let developer_1 = seed_user(&store, "developer-1", UserRole::Developer).await?;
        let developer_2 = seed_user(&store, "developer-2", UserRole::Developer).await?;
        let developer_3 = seed_user(&store, "developer-3", UserRole::Developer).await?;

        let proj_11 = store
            .create_project(CreateProject {
                name: Some("proj-11".to_string()),
                manager_id: manager_1.id,
                developers: vec![developer_1.id, developer_2.id],
            })
            .await?
            .id;
        let proj_12 = store
            .create_project(CreateProject {
                name: Some("proj-12".to_string()),
                manager_id: manager_1.id,
                developers: vec![developer_3.id],
            })
            .await?
            .id;

        let task_11 = seed_task(&store, proj_11, manager_1.id, "task-11", vec![developer_1.id]).await?;
        let task_12 = seed_task(&store, proj_11, manager_1.id, "task-12", vec![]).await?;

        let state = AppState::new(store.clone(), test_config());
        let app = build_router(state);

        Ok(Self {
            store,
            app,
            manager_1,
            manager_2,
            developer_1,
            developer_2,
            developer_3,
            proj_11,
            proj_12,
            task_11,
            task_12,
        })
    }

    /// Sends one request through the router and decodes the JSON body
    ///
    /// Empty bodies decode to `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<&User>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, auth_header(user));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        send(&self.app, request).await
    }

    pub async fn get(&self, uri: &str, user: &User) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: &User, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(user), Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: &User, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(user), Some(body)).await
    }
}

/// Runs a request against a router
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, body)
}

pub fn access_token(user: &User) -> String {
    create_token(
        &Claims::new(user.id, user.username.clone(), TokenType::Access),
        JWT_SECRET,
    )
    .unwrap()
}

pub fn auth_header(user: &User) -> String {
    format!("Bearer {}", access_token(user))
}

/// Ids of a JSON array of entities, in response order
pub fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|item| item["id"].as_i64().expect("id"))
        .collect()
}
