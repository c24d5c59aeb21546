//! Core business logic for Scholaris.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached only through the store traits declared here and
//! implemented by `scholaris-db`.
//!
//! # Modules
//!
//! - `auth` - Roles, passwords, session tokens and the session authority
//! - `fees` - Payment ledger, receipt numbering and fee status
//! - `provisioning` - Schools, principals, enrollment and fee structures
//! - `store` - Errors shared by every store implementation
//! - `memory` - In-memory stores for tests (`test-support` feature)

pub mod auth;
pub mod fees;
pub mod provisioning;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod memory;

pub use store::StoreError;
