/// Request authentication
///
/// Turns an `Authorization: Bearer <access token>` header into an
/// [`AuthContext`]. The API crate runs [`authenticate`] from its JWT layer and
/// inserts the context into request extensions, where handlers pick it up
/// with `Extension<AuthContext>`.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use taskboard_shared::auth::jwt::{create_token, Claims, TokenType};
/// use taskboard_shared::auth::middleware::authenticate;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let token = create_token(&Claims::new(3, "developer-1", TokenType::Access), secret)?;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
///
/// let auth = authenticate(&headers, secret)?;
/// assert_eq!(auth.user_id, 3);
/// # Ok(())
/// # }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

use super::jwt::{validate_access_token, JwtError};

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No usable Authorization header
    #[error("Missing authorization header")]
    MissingCredentials,

    /// Header present but not a Bearer credential
    #[error("{0}")]
    InvalidFormat(String),

    /// Token rejected
    #[error("{0}")]
    InvalidToken(String),
}

/// Extracts the raw token from a `Bearer` Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Validates the request's access token and returns the caller
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;

    let claims = validate_access_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken("Invalid token".to_string()),
    })?;

    let user_id = claims
        .user_id()
        .map_err(|_| AuthError::InvalidToken("Invalid token subject".to_string()))?;

    Ok(AuthContext {
        user_id,
        username: claims.username,
    })
}
