/// Middleware for the API server
///
/// - `security`: security response headers
///
/// JWT authentication lives in `app::jwt_auth_layer` because it needs the
/// application state.

pub mod security;
