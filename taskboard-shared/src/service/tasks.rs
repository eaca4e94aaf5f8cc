//! Task operations
//!
//! Who may do what:
//!
//! - list, create: project members (manager or developer)
//! - update: project members and the task's current assignees
//!
//! Every assignee written must be a developer of the task's project.

use serde::Deserialize;
use tracing::{debug, info};
use validator::{Validate, ValidationError};

use super::{
    denied, double_option, field_errors, invalid, load_project, normalize_ids, unknown_user,
    FieldError, ServiceError, ServiceResult, BLANK_MESSAGE, NULL_MESSAGE,
};
use crate::auth::authorization::{
    assignees_within_project, require_member_or_assignee, require_project_member,
};
use crate::db::store::Store;
use crate::models::task::{CreateTask, Task, UpdateTask, DEFAULT_TASK_TITLE, MAX_TITLE_LENGTH};

/// Create-task request body
///
/// `id`, `project` and `creator` are not accepted from the body; the project
/// comes from the path and the creator is the caller.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewTask {
    #[validate(custom(function = "validate_title"))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub is_done: Option<bool>,

    pub assignee: Option<Vec<i64>>,
}

/// Update-task request body; absent fields stay unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TaskChanges {
    /// `null` is rejected; a task always has a title
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,

    /// `null` clears the description
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    pub is_done: Option<bool>,

    /// Replaces the whole assignee set
    pub assignee: Option<Vec<i64>>,
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(invalid("blank", BLANK_MESSAGE));
    }
    if title.chars().count() as u64 > MAX_TITLE_LENGTH {
        return Err(invalid(
            "max_length",
            format!("Ensure this field has no more than {MAX_TITLE_LENGTH} characters."),
        ));
    }
    Ok(())
}

fn title_change_error(title: &Option<Option<String>>) -> Option<FieldError> {
    match title {
        None => None,
        Some(None) => Some(FieldError::new("title", NULL_MESSAGE)),
        Some(Some(title)) => validate_title(title).err().map(|err| {
            let message = err.message.map(|m| m.into_owned()).unwrap_or_default();
            FieldError::new("title", message)
        }),
    }
}

/// Validates fields and assignee existence, returning the normalized assignee set
async fn check_fields(
    store: &dyn Store,
    mut errors: Vec<FieldError>,
    assignee: Option<Vec<i64>>,
) -> ServiceResult<Option<Vec<i64>>> {
    let assignee = assignee.map(normalize_ids);

    if let Some(ids) = &assignee {
        if let Some(error) = unknown_user(store, "assignee", ids).await? {
            errors.push(error);
        }
    }
    errors.sort_by(|a, b| a.field.cmp(&b.field));

    if !errors.is_empty() {
        debug!(errors = errors.len(), "Task input rejected");
        return Err(ServiceError::Validation(errors));
    }

    Ok(assignee)
}

/// Lists a project's tasks, optionally only those assigned to one developer
///
/// # Errors
///
/// - `NotFound("Project")` if the project doesn't exist
/// - `PermissionDenied` unless the caller is a project member
/// - `NotFound("Assignee")` if `assignee_id` is not a developer of the project
pub async fn list(
    store: &dyn Store,
    user_id: i64,
    project_id: i64,
    assignee_id: Option<i64>,
) -> ServiceResult<Vec<Task>> {
    let project = load_project(store, project_id).await?;
    require_project_member(user_id, &project).map_err(denied)?;

    if let Some(assignee_id) = assignee_id {
        if !project.has_developer(assignee_id) {
            return Err(ServiceError::NotFound("Assignee"));
        }
    }

    let tasks = store.list_tasks(project_id, assignee_id).await?;

    debug!(project_id, assignee_id, count = tasks.len(), "Tasks listed");
    Ok(tasks)
}

/// Creates a task in a project on behalf of the caller
///
/// Nothing is written unless every check passes.
pub async fn create(
    store: &dyn Store,
    user_id: i64,
    project_id: i64,
    input: NewTask,
) -> ServiceResult<Task> {
    let assignee = check_fields(store, field_errors(input.validate()), input.assignee)
        .await?
        .unwrap_or_default();

    let project = load_project(store, project_id).await?;
    require_project_member(user_id, &project).map_err(denied)?;

    if !assignees_within_project(&assignee, &project) {
        debug!(project_id, ?assignee, "Assignee outside project");
        return Err(ServiceError::AssigneeNotProjectMember);
    }

    let task = store
        .create_task(CreateTask {
            project_id,
            creator_id: user_id,
            title: input
                .title
                .unwrap_or_else(|| DEFAULT_TASK_TITLE.to_string()),
            description: input.description,
            is_done: input.is_done.unwrap_or(false),
            assignee,
        })
        .await?;

    info!(task_id = task.id, project_id, creator_id = user_id, "Task created");
    Ok(task)
}

/// Applies a partial update to a task
///
/// The task must belong to `project_id`. Project members and the task's
/// current assignees may update it.
pub async fn update(
    store: &dyn Store,
    user_id: i64,
    project_id: i64,
    task_id: i64,
    changes: TaskChanges,
) -> ServiceResult<Task> {
    let task = store
        .find_task(task_id)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;
    let project = load_project(store, project_id).await?;
    if task.project_id != project.id {
        return Err(ServiceError::NotFound("Task"));
    }

    let mut errors = field_errors(changes.validate());
    errors.extend(title_change_error(&changes.title));
    let assignee = check_fields(store, errors, changes.assignee).await?;

    require_member_or_assignee(user_id, &project, &task).map_err(denied)?;

    if let Some(ids) = &assignee {
        if !assignees_within_project(ids, &project) {
            debug!(task_id, ?ids, "Assignee outside project");
            return Err(ServiceError::AssigneeNotProjectMember);
        }
    }

    let update = UpdateTask {
        title: changes.title.flatten(),
        description: changes.description,
        is_done: changes.is_done,
        assignee,
    };

    let task = store
        .update_task(task_id, update)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;

    info!(task_id, project_id, user_id, "Task updated");
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("task-11").is_ok());
        assert!(validate_title(&"t".repeat(200)).is_ok());
        assert!(validate_title(&"t".repeat(201)).is_err());
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
    }

    #[test]
    fn test_new_task_ignores_read_only_fields() {
        let input: NewTask =
            serde_json::from_str(r#"{"id": 9, "project": 99, "creator": 42, "title": "t"}"#).unwrap();
        assert_eq!(input.title.as_deref(), Some("t"));
        assert!(input.assignee.is_none());
    }

    #[test]
    fn test_task_changes_title_validation() {
        let blank = title_change_error(&Some(Some(String::new())));
        assert_eq!(blank, Some(FieldError::new("title", BLANK_MESSAGE)));

        let too_long = title_change_error(&Some(Some("t".repeat(201)))).unwrap();
        assert_eq!(too_long.message, "Ensure this field has no more than 200 characters.");

        assert_eq!(title_change_error(&Some(Some("task-11".to_string()))), None);
        assert_eq!(title_change_error(&None), None);
        assert!(TaskChanges::default().validate().is_ok());
    }

    #[test]
    fn test_task_changes_null_title() {
        let changes: TaskChanges = serde_json::from_str(r#"{"title": null}"#).unwrap();
        assert_eq!(changes.title, Some(None));
        assert_eq!(
            title_change_error(&changes.title),
            Some(FieldError::new("title", NULL_MESSAGE))
        );

        let absent: TaskChanges = serde_json::from_str(r#"{"is_done": true}"#).unwrap();
        assert_eq!(absent.title, None);
    }
}
