//! Shared types, errors, and configuration for Scholaris.
//!
//! This crate provides common types used across all other crates:
//! - Money type with decimal precision
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - Request and response payloads for the HTTP surface

pub mod auth;
pub mod config;
pub mod error;
pub mod fees;
pub mod types;


pub use config::AppConfig;
pub use error::{AppError, AppResult};
