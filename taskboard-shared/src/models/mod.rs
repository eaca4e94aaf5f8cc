/// Database models for Taskboard
///
/// This module contains the persisted entities and their PostgreSQL
/// operations. Higher layers reach them through the `db::store::Store` port.
///
/// # Models
///
/// - `user`: Accounts created at signup
/// - `project`: Projects, their manager and developer members
/// - `task`: Project tasks and their assignees

pub mod project;
pub mod task;
pub mod user;
