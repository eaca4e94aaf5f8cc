/// Project endpoints
///
/// - `POST /projects/` - Create a project managed by the caller
/// - `GET /projects/:project_id/` - Project detail, members only
/// - `POST /projects/:project_id/developers/` - Add a developer, manager only

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
    models::project::Project,
    service::projects::{self, AddDeveloper, NewProject},
};

/// Creates a project; the caller becomes its manager
///
/// ```text
/// POST /projects/
///
/// { "name": "proj-11", "developers": [3, 4] }
/// ```
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<NewProject>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let Json(input) = payload?;

    let project = projects::create(state.store.as_ref(), auth.user_id, input).await?;

    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Project>> {
    let Path(project_id) = path?;

    let project = projects::get(state.store.as_ref(), auth.user_id, project_id).await?;

    Ok(Json(project))
}

/// Adds a developer to a project
///
/// ```text
/// POST /projects/11/developers/
///
/// { "user_id": 5 }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: project, or (for the manager) user, does not exist
/// - `401 Unauthorized` (`PERMISSION_DENIED`): caller is not the manager
pub async fn add_developer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<AddDeveloper>, JsonRejection>,
) -> ApiResult<Json<Project>> {
    let Path(project_id) = path?;
    let Json(input) = payload?;

    let project =
        projects::add_developer(state.store.as_ref(), auth.user_id, project_id, input).await?;

    Ok(Json(project))
}
