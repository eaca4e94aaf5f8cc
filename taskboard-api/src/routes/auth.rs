/// Account endpoints
///
/// - `POST /projects/signup/` - Create a user
/// - `POST /projects/login/` - Exchange credentials for tokens
/// - `POST /projects/token/refresh/` - Exchange a refresh token for an access token

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::jwt,
    models::user::{User, UserRole},
    service::accounts::{self, LoginInput, SignupInput},
};

/// Signup response; the password is write-only
#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    pub id: i64,
    pub username: String,
    pub user_role: UserRole,
}

impl From<User> for SignupResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            user_role: user.user_role,
        }
    }
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// User ID
    pub user_id: i64,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Creates a user account
///
/// ```text
/// POST /projects/signup/
///
/// { "username": "developer-1", "password": "secret", "user_role": "developer" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: field errors for a blank, malformed or taken username,
///   a blank password or an unknown role (all reported together)
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    let Json(input) = payload?;

    let user = accounts::signup(state.store.as_ref(), input).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Authenticates a user and returns JWT tokens
///
/// # Errors
///
/// - `400 Bad Request`: blank username or password
/// - `401 Unauthorized`: unknown username or wrong password
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(input) = payload?;

    let user = accounts::authenticate(state.store.as_ref(), input).await?;

    let access_claims = jwt::Claims::new(user.id, user.username.clone(), jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, user.username.clone(), jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(Json(LoginResponse {
        user_id: user.id,
        access_token,
        refresh_token,
    }))
}

/// Exchanges a refresh token for a new access token
///
/// # Errors
///
/// - `401 Unauthorized`: invalid or expired token, or an access token
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<Json<RefreshResponse>> {
    let Json(req) = payload?;

    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}
