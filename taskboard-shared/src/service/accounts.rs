//! Signup and credential checks

use serde::Deserialize;
use tracing::{debug, info};
use validator::{Validate, ValidationError};

use super::{field_errors, invalid, FieldError, ServiceError, ServiceResult, BLANK_MESSAGE};
use crate::auth::password::{hash_password, verify_password};
use crate::db::store::{Store, StoreError};
use crate::models::user::{CreateUser, User, UserRole};

/// Maximum username length in characters
pub const MAX_USERNAME_LENGTH: usize = 150;

const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// Signup request body
///
/// Missing or whitespace-only text fields are reported as blank; a missing
/// role defaults to `manager`. The username is stored trimmed.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupInput {
    #[serde(default)]
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub password: String,

    #[serde(default = "default_role")]
    #[validate(custom(function = "validate_user_role"))]
    pub user_role: String,
}

/// Login request body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginInput {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub username: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub password: String,
}

fn default_role() -> String {
    UserRole::default().as_str().to_string()
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(invalid("blank", BLANK_MESSAGE));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(invalid(
            "max_length",
            format!("Ensure this field has no more than {MAX_USERNAME_LENGTH} characters."),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(invalid(
            "invalid",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", BLANK_MESSAGE));
    }
    Ok(())
}

fn validate_user_role(role: &str) -> Result<(), ValidationError> {
    if UserRole::parse(role).is_none() {
        return Err(invalid("invalid_choice", format!("\"{role}\" is not a valid choice.")));
    }
    Ok(())
}

/// Creates a user account
///
/// All field problems, including a taken username, are reported together.
///
/// # Errors
///
/// [`ServiceError::Validation`] with one entry per offending field.
pub async fn signup(store: &dyn Store, input: SignupInput) -> ServiceResult<User> {
    let input = SignupInput {
        username: input.username.trim().to_string(),
        ..input
    };
    let mut errors = field_errors(input.validate());

    let username_ok = !errors.iter().any(|e| e.field == "username");
    if username_ok && store.find_user_by_username(&input.username).await?.is_some() {
        errors.push(FieldError::new("username", USERNAME_TAKEN));
        errors.sort_by(|a, b| a.field.cmp(&b.field));
    }

    if !errors.is_empty() {
        debug!(errors = errors.len(), "Signup rejected");
        return Err(ServiceError::Validation(errors));
    }

    let user_role = UserRole::parse(&input.user_role).unwrap_or_default();
    let password_hash = hash_password(&input.password)?;

    let user = store
        .create_user(CreateUser {
            username: input.username,
            password_hash,
            user_role,
        })
        .await
        .map_err(|e| match e {
            // lost a race with a concurrent signup
            StoreError::Duplicate(_) => {
                ServiceError::Validation(vec![FieldError::new("username", USERNAME_TAKEN)])
            }
            other => other.into(),
        })?;

    info!(user_id = user.id, username = %user.username, role = user.user_role.as_str(), "User signed up");
    Ok(user)
}

/// Checks a username/password pair
///
/// # Errors
///
/// [`ServiceError::InvalidCredentials`] for an unknown user or wrong password;
/// the two cases are indistinguishable to the caller.
pub async fn authenticate(store: &dyn Store, input: LoginInput) -> ServiceResult<User> {
    let errors = field_errors(input.validate());
    if !errors.is_empty() {
        return Err(ServiceError::Validation(errors));
    }

    let Some(user) = store.find_user_by_username(input.username.trim()).await? else {
        debug!(username = %input.username, "Login for unknown user");
        return Err(ServiceError::InvalidCredentials);
    };

    if !verify_password(&input.password, &user.password_hash)? {
        debug!(user_id = user.id, "Login with wrong password");
        return Err(ServiceError::InvalidCredentials);
    }

    info!(user_id = user.id, "User logged in");
    Ok(user)
}
