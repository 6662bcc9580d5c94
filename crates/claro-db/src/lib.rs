//! claro Database Library
//!
//! Postgres-backed user store for the claro user directory. The `users`
//! table is keyed by the provider-issued external identity id, with a
//! unique index that is the single arbiter of concurrent create races.
//!
//! # Modules
//!
//! - [`models`] - Entity models (`User`) and write parameter types
//! - [`migrations`] - Embedded SQL migration runner
//! - [`error`] - Database error types (`DbError`)

pub mod error;
pub mod migrations;
pub mod models;

// Re-export main types for convenient access
pub use error::DbError;
pub use migrations::run_migrations;
pub use models::{NewUserProfile, User};
