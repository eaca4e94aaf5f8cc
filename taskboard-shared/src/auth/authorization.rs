/// Authorization policy
///
/// Authority comes from relationships only:
///
/// 1. **Project member**: the project's manager, or a listed developer
/// 2. **Project manager**: the single user who owns the project
/// 3. **Task assignee**: a user in the task's assignee set
///
/// A user's declared `user_role` is never consulted. The predicates are pure
/// and infallible; the `require_*` guards wrap them for use with `?`.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use taskboard_shared::auth::authorization::{is_project_member, require_project_member};
/// use taskboard_shared::models::project::Project;
///
/// let project = Project {
///     id: 11,
///     name: Some("proj-11".to_string()),
///     manager_id: 1,
///     manager_name: "manager-1".to_string(),
///     developers: vec![3, 4],
///     created_at: Utc::now(),
/// };
///
/// assert!(is_project_member(1, &project));
/// assert!(is_project_member(3, &project));
/// assert!(require_project_member(2, &project).is_err());
/// ```

use crate::models::{project::Project, task::Task};

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller is neither the manager nor a developer of the project
    #[error("User {user_id} is not a member of project {project_id}")]
    NotProjectMember { user_id: i64, project_id: i64 },

    /// Caller does not manage the project
    #[error("User {user_id} is not the manager of project {project_id}")]
    NotProjectManager { user_id: i64, project_id: i64 },

    /// Caller is not a member and not assigned to the task
    #[error("User {user_id} may not modify task {task_id}")]
    NotTaskParticipant { user_id: i64, task_id: i64 },
}

/// True iff `user_id` manages the project or is one of its developers
pub fn is_project_member(user_id: i64, project: &Project) -> bool {
    is_project_manager(user_id, project) || project.has_developer(user_id)
}

pub fn is_project_manager(user_id: i64, project: &Project) -> bool {
    project.manager_id == user_id
}

pub fn is_task_assignee(user_id: i64, task: &Task) -> bool {
    task.has_assignee(user_id)
}

/// True iff every id in `assignee` is a developer of the project
///
/// The manager is deliberately not an eligible assignee unless they are also
/// listed as a developer. An empty set is always within the project.
pub fn assignees_within_project(assignee: &[i64], project: &Project) -> bool {
    assignee.iter().all(|id| project.has_developer(*id))
}

pub fn require_project_member(user_id: i64, project: &Project) -> Result<(), AuthzError> {
    if !is_project_member(user_id, project) {
        return Err(AuthzError::NotProjectMember {
            user_id,
            project_id: project.id,
        });
    }

    Ok(())
}

pub fn require_project_manager(user_id: i64, project: &Project) -> Result<(), AuthzError> {
    if !is_project_manager(user_id, project) {
        return Err(AuthzError::NotProjectManager {
            user_id,
            project_id: project.id,
        });
    }

    Ok(())
}

/// Allows project members and the task's current assignees
pub fn require_member_or_assignee(
    user_id: i64,
    project: &Project,
    task: &Task,
) -> Result<(), AuthzError> {
    if !is_project_member(user_id, project) && !is_task_assignee(user_id, task) {
        return Err(AuthzError::NotTaskParticipant {
            user_id,
            task_id: task.id,
        });
    }

    Ok(())
}
