//! Application services
//!
//! Each operation takes the store, the calling user's id and a validated
//! input, applies the authorization policy and then mutates the store. The
//! order of checks is fixed: field validation, then lookups (NotFound), then
//! permission, then the assignee-membership rule.
//!
//! - [`accounts`]: signup and credential checks
//! - [`projects`]: create, view, add developer
//! - [`tasks`]: list, create, update

pub mod accounts;
pub mod projects;
pub mod tasks;

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use tracing::warn;
use validator::{ValidationError, ValidationErrors};

use crate::auth::{authorization::AuthzError, jwt::JwtError, password::PasswordError};
use crate::db::store::{Store, StoreError};
use crate::models::project::Project;

/// A validation failure on one input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error type for service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Referenced entity does not exist ("Project", "Task", "User"...)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// One or more input fields are invalid
    #[error("Validation failed: {} errors", .0.len())]
    Validation(Vec<FieldError>),

    /// Caller lacks the relationship the operation requires
    #[error("Permission denied: {0}")]
    PermissionDenied(#[from] AuthzError),

    /// An assignee is not a developer of the task's project
    #[error("Assignee is not a member of the project")]
    AssigneeNotProjectMember,

    /// Unknown username or wrong password
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] JwtError),
}

/// Service result type alias
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Message for required text left empty
pub const BLANK_MESSAGE: &str = "This field may not be blank.";

/// Message for a required field sent as `null`
pub const NULL_MESSAGE: &str = "This field may not be null.";

/// Builds a validator error carrying a human-readable message
pub(crate) fn invalid(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Flattens validator output into field errors, ordered by field name
pub(crate) fn field_errors(result: Result<(), ValidationErrors>) -> Vec<FieldError> {
    let Err(errors) = result else {
        return Vec::new();
    };

    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect()
}

/// Sorts and de-duplicates a set of user ids
pub(crate) fn normalize_ids(mut ids: Vec<i64>) -> Vec<i64> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Reports the first id in `ids` that names no user, as an error on `field`
pub(crate) async fn unknown_user(
    store: &dyn Store,
    field: &str,
    ids: &[i64],
) -> ServiceResult<Option<FieldError>> {
    if ids.is_empty() {
        return Ok(None);
    }

    let existing = store.existing_user_ids(ids).await?;
    Ok(ids
        .iter()
        .find(|id| !existing.contains(id))
        .map(|id| FieldError::new(field, format!("Invalid pk \"{id}\" - object does not exist."))))
}

pub(crate) async fn load_project(store: &dyn Store, project_id: i64) -> ServiceResult<Project> {
    store
        .find_project(project_id)
        .await?
        .ok_or(ServiceError::NotFound("Project"))
}

/// Logs a policy refusal and converts it
pub(crate) fn denied(err: AuthzError) -> ServiceError {
    warn!(reason = %err, "Access denied");
    ServiceError::PermissionDenied(err)
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
