/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_api::{app::AppState, config::Config};
/// use taskboard_shared::db::{pool, PgStore};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = pool::create_pool(pool::DatabaseConfig::new(config.database.url.clone())).await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config);
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::security::SecurityHeadersLayer,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use taskboard_shared::auth::middleware::authenticate;
use taskboard_shared::db::Store;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend
    pub store: Arc<dyn Store>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET  /health                                    (public)
/// └── /projects/
///     ├── POST /signup/                               (public)
///     ├── POST /login/                                (public)
///     ├── POST /token/refresh/                        (public)
///     ├── POST /                                      create project
///     ├── GET  /:project_id/                          project detail
///     ├── POST /:project_id/developers/               add developer
///     ├── GET  /:project_id/tasks                     list tasks
///     ├── GET  /:project_id/assignee/:assignee_id/tasks
///     ├── POST /:project_id/tasks/                    create task
///     └── PUT  /:project_id/tasks/:task_id/           update task
/// ```
///
/// Everything outside the public set goes through [`jwt_auth_layer`]. The
/// auth layer is a `route_layer`, so unknown paths still answer 404.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/projects/signup/", post(routes::auth::signup))
        .route("/projects/login/", post(routes::auth::login))
        .route("/projects/token/refresh/", post(routes::auth::refresh));

    let protected_routes = Router::new()
        .route("/projects/", post(routes::projects::create_project))
        .route("/projects/:project_id/", get(routes::projects::get_project))
        .route(
            "/projects/:project_id/developers/",
            post(routes::projects::add_developer),
        )
        .route("/projects/:project_id/tasks", get(routes::tasks::list_tasks))
        .route(
            "/projects/:project_id/assignee/:assignee_id/tasks",
            get(routes::tasks::list_assignee_tasks),
        )
        .route("/projects/:project_id/tasks/", post(routes::tasks::create_task))
        .route(
            "/projects/:project_id/tasks/:task_id/",
            put(routes::tasks::update_task),
        )
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_layer));

    let cors = if state.config.cors_permissive() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the Bearer access token and injects
/// [`AuthContext`](taskboard_shared::auth::middleware::AuthContext) into
/// request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(req.headers(), state.jwt_secret())?;

    tracing::debug!(user_id = auth.user_id, "Request authenticated");
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
