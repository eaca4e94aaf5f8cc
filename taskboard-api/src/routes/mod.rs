/// API route handlers, by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Signup, login and token refresh
/// - `projects`: Project creation, detail and developer management
/// - `tasks`: Task listing, creation and update

pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;
