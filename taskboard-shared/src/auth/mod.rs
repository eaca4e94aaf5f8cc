/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: HS256 access/refresh tokens
/// - [`middleware`]: Bearer header to [`AuthContext`](middleware::AuthContext)
/// - [`authorization`]: relationship-based access predicates
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::password::{hash_password, verify_password};
/// use taskboard_shared::auth::jwt::{create_token, validate_token, Claims, TokenType};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("pass")?;
/// assert!(verify_password("pass", &hash)?);
///
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let token = create_token(&Claims::new(1, "manager-1", TokenType::Access), secret)?;
/// assert_eq!(validate_token(&token, secret)?.username, "manager-1");
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
