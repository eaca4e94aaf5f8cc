//! Project operations

use serde::Deserialize;
use tracing::{debug, info};

use super::{denied, load_project, normalize_ids, unknown_user, ServiceError, ServiceResult};
use crate::auth::authorization::{require_project_manager, require_project_member};
use crate::db::store::Store;
use crate::models::project::{CreateProject, Project};

/// Create-project request body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProject {
    #[serde(default)]
    pub name: Option<String>,

    /// Initial developer ids
    #[serde(default)]
    pub developers: Vec<i64>,
}

/// Add-developer request body
#[derive(Debug, Clone, Deserialize)]
pub struct AddDeveloper {
    pub user_id: i64,
}

/// Creates a project managed by the caller
pub async fn create(store: &dyn Store, user_id: i64, input: NewProject) -> ServiceResult<Project> {
    let developers = normalize_ids(input.developers);

    if let Some(error) = unknown_user(store, "developers", &developers).await? {
        return Err(ServiceError::Validation(vec![error]));
    }

    let project = store
        .create_project(CreateProject {
            name: input.name,
            manager_id: user_id,
            developers,
        })
        .await?;

    info!(
        project_id = project.id,
        manager_id = user_id,
        developers = project.developers.len(),
        "Project created"
    );
    Ok(project)
}

/// Returns a project to one of its members
pub async fn get(store: &dyn Store, user_id: i64, project_id: i64) -> ServiceResult<Project> {
    let project = load_project(store, project_id).await?;
    require_project_member(user_id, &project).map_err(denied)?;

    debug!(project_id, user_id, "Project fetched");
    Ok(project)
}

/// Adds a developer to a project; only its manager may do this
///
/// Adding someone who already is a developer changes nothing. The user is
/// looked up after the permission check so non-managers learn nothing about
/// which ids exist.
pub async fn add_developer(
    store: &dyn Store,
    user_id: i64,
    project_id: i64,
    input: AddDeveloper,
) -> ServiceResult<Project> {
    let project = load_project(store, project_id).await?;
    require_project_manager(user_id, &project).map_err(denied)?;

    if store.find_user(input.user_id).await?.is_none() {
        return Err(ServiceError::NotFound("User"));
    }

    let added = store.add_project_developer(project_id, input.user_id).await?;
    if added {
        info!(project_id, developer_id = input.user_id, "Developer added to project");
    } else {
        debug!(project_id, developer_id = input.user_id, "Developer already in project");
    }

    load_project(store, project_id).await
}
