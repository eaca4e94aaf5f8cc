/// Task endpoints
///
/// - `GET /projects/:project_id/tasks` - All tasks of a project
/// - `GET /projects/:project_id/assignee/:assignee_id/tasks` - Tasks of one developer
/// - `POST /projects/:project_id/tasks/` - Create a task
/// - `PUT /projects/:project_id/tasks/:task_id/` - Partially update a task
///
/// Listing and creating need project membership (manager or developer).
/// Updating is also open to the task's current assignees.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::task::Task,
    service::tasks::{self, NewTask, TaskChanges},
};

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Path(project_id) = path?;

    let tasks = tasks::list(state.store.as_ref(), auth.user_id, project_id, None).await?;

    Ok(Json(tasks))
}

/// Lists the project's tasks assigned to one developer
///
/// # Errors
///
/// - `404 Not Found`: project missing, or `assignee_id` is not one of its
///   developers
pub async fn list_assignee_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Path((project_id, assignee_id)) = path?;

    let tasks = tasks::list(
        state.store.as_ref(),
        auth.user_id,
        project_id,
        Some(assignee_id),
    )
    .await?;

    Ok(Json(tasks))
}

/// Creates a task; the caller is recorded as its creator
///
/// ```text
/// POST /projects/11/tasks/
///
/// { "title": "Fix login", "description": "...", "assignee": [3] }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: field errors, or `ASSIGNEE_NOT_PROJECT_MEMBER`
/// - `401 Unauthorized` (`PERMISSION_DENIED`): caller is not a project member
/// - `404 Not Found`: project does not exist
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Path(project_id) = path?;
    let Json(input) = payload?;

    let task = tasks::create(state.store.as_ref(), auth.user_id, project_id, input).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Updates the fields present in the body; others are left alone
///
/// An `assignee` list replaces the whole assignee set. `id`, `project` and
/// `creator` in the body are ignored.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<(i64, i64)>, PathRejection>,
    payload: Result<Json<TaskChanges>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Path((project_id, task_id)) = path?;
    let Json(changes) = payload?;

    let task = tasks::update(
        state.store.as_ref(),
        auth.user_id,
        project_id,
        task_id,
        changes,
    )
    .await?;

    Ok(Json(task))
}
