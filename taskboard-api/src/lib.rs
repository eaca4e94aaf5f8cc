//! # Taskboard API Server Library
//!
//! HTTP surface of the task tracker: routing, authentication, error mapping
//! and configuration. Business rules live in `taskboard_shared::service`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
