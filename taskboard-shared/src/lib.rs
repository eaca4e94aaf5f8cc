//! # Taskboard Shared Library
//!
//! Domain types, persistence and business rules used by the Taskboard API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: users, projects, tasks and their PostgreSQL queries
//! - `db`: connection pool, migrations and the `Store` port with its adapters
//! - `auth`: password hashing, JWT, bearer authentication, access policy
//! - `service`: the operations exposed over HTTP

pub mod auth;
pub mod db;
pub mod models;
pub mod service;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
