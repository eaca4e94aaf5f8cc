/// Error handling for the API server
///
/// Every handler returns `ApiResult<T>`. Lower-layer errors convert into
/// [`ApiError`] with `?`, and [`ApiError`] is the one place that decides the
/// HTTP status and body.
///
/// # Example
///
/// ```no_run
/// use axum::{extract::State, Json};
/// use taskboard_api::app::AppState;
/// use taskboard_api::error::ApiResult;
/// use taskboard_shared::models::project::Project;
/// use taskboard_shared::service::projects;
///
/// async fn handler(State(state): State<AppState>) -> ApiResult<Json<Project>> {
///     let project = projects::get(state.store.as_ref(), 1, 11).await?;
///     Ok(Json(project))
/// }
/// ```

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskboard_shared::auth::{jwt::JwtError, middleware::AuthError, password::PasswordError};
use taskboard_shared::db::StoreError;
use taskboard_shared::service::{FieldError, ServiceError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Error code for a caller without the required project relationship
pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";

/// Error code for an assignee outside the project's developers
pub const ASSIGNEE_NOT_PROJECT_MEMBER: &str = "ASSIGNEE_NOT_PROJECT_MEMBER";

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400), e.g. malformed JSON
    BadRequest(String),

    /// Unauthorized (401): missing or invalid credentials
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Field validation failed (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Caller may not act on the resource (401)
    PermissionDenied,

    /// Assignee set is not within the project's developers (400)
    AssigneeNotProjectMember,

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl From<FieldError> for ValidationErrorDetail {
    fn from(err: FieldError) -> Self {
        Self {
            field: err.field,
            message: err.message,
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g. "not_found", "PERMISSION_DENIED")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Field errors, only for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::PermissionDenied => write!(f, "Permission denied"),
            ApiError::AssigneeNotProjectMember => {
                write!(f, "Assignee is not a member of the project")
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::PermissionDenied => (
                StatusCode::UNAUTHORIZED,
                PERMISSION_DENIED,
                "You do not have permission to perform this action".to_string(),
                None,
            ),
            ApiError::AssigneeNotProjectMember => (
                StatusCode::BAD_REQUEST,
                ASSIGNEE_NOT_PROJECT_MEMBER,
                "Assignee is not a member of the project".to_string(),
                None,
            ),
            ApiError::InternalError(msg) => {
                // Logged here, never sent to the client
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert service errors to API errors
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(entity) => ApiError::NotFound(format!("{} not found", entity)),
            ServiceError::Validation(errors) => {
                ApiError::ValidationError(errors.into_iter().map(Into::into).collect())
            }
            ServiceError::PermissionDenied(_) => ApiError::PermissionDenied,
            ServiceError::AssigneeNotProjectMember => ApiError::AssigneeNotProjectMember,
            ServiceError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid username or password".to_string())
            }
            ServiceError::Store(err) => err.into(),
            ServiceError::Password(err) => err.into(),
            ServiceError::Token(err) => err.into(),
        }
    }
}

/// Convert store errors to API errors
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::InternalError(format!("Store error: {}", err))
    }
}

/// Convert auth errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Missing credentials".to_string())
            }
            AuthError::InvalidFormat(msg) => ApiError::BadRequest(msg),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => {
                ApiError::InternalError(format!("Token creation failed: {}", msg))
            }
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer { .. } => {
                ApiError::Unauthorized("Invalid token issuer".to_string())
            }
            _ => ApiError::Unauthorized("Invalid token".to_string()),
        }
    }
}

/// Convert JSON body rejections to API errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Convert path rejections to API errors
///
/// An id segment that is not an integer names no resource, so it answers 404
/// like any other unknown id.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(err) => {
                ApiError::NotFound(err.body_text())
            }
            other => ApiError::InternalError(format!("Path extraction failed: {}", other.body_text())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_shared::auth::authorization::AuthzError;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Task not found".to_string());
        assert_eq!(err.to_string(), "Not found: Task not found");
    }

    #[test]
    fn test_validation_error() {
        let errors = vec![
            ValidationErrorDetail {
                field: "username".to_string(),
                message: "This field may not be blank.".to_string(),
            },
            ValidationErrorDetail {
                field: "password".to_string(),
                message: "This field may not be blank.".to_string(),
            },
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::PermissionDenied, StatusCode::UNAUTHORIZED),
            (ApiError::AssigneeNotProjectMember, StatusCode::BAD_REQUEST),
            (ApiError::ValidationError(vec![]), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::InternalError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_service_error_mapping() {
        let denied: ApiError = ServiceError::PermissionDenied(AuthzError::NotProjectMember {
            user_id: 7,
            project_id: 11,
        })
        .into();
        assert!(matches!(denied, ApiError::PermissionDenied));

        let missing: ApiError = ServiceError::NotFound("Assignee").into();
        assert!(matches!(missing, ApiError::NotFound(ref m) if m == "Assignee not found"));

        let invalid: ApiError =
            ServiceError::Validation(vec![FieldError::new("title", "too long")]).into();
        match invalid {
            ApiError::ValidationError(details) => {
                assert_eq!(details[0].field, "title");
                assert_eq!(details[0].message, "too long");
            }
            other => panic!("unexpected {other:?}"),
        }

        let store: ApiError = ServiceError::Store(StoreError::Poisoned).into();
        assert!(matches!(store, ApiError::InternalError(_)));
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            ApiError::from(AuthError::MissingCredentials),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::InvalidFormat("Expected Bearer token".into())),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(JwtError::Expired),
            ApiError::Unauthorized(ref m) if m == "Token expired"
        ));
    }
}
