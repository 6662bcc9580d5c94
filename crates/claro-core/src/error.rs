//! Error Types
//!
//! This module provides standardized error types for claro.
//!
//! # Example
//!
//! ```
//! use claro_core::{ClaroError, Result};
//!
//! fn find_user(id: &str) -> Result<String> {
//!     if id.is_empty() {
//!         return Err(ClaroError::NotFound {
//!             resource: "User".to_string(),
//!             id: None,
//!         });
//!     }
//!     Ok(format!("User {}", id))
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

/// Standardized error type for claro.
///
/// This enum provides consistent error types that can be used across all
/// claro crates. Each variant maps to common error scenarios.
#[derive(Debug, Clone, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaroError {
    /// Requested resource was not found.
    ///
    /// Use when a store lookup returns no results.
    #[error("{resource} not found{}", id.as_ref().map(|i| format!(": {i}")).unwrap_or_default())]
    NotFound {
        /// The type of resource that was not found (e.g., "User")
        resource: String,
        /// Optional identifier of the resource
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Input validation failure.
    ///
    /// Use when input fails validation rules.
    #[error("Validation error on field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },
}

/// Result type alias using [`ClaroError`].
pub type Result<T> = std::result::Result<T, ClaroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display_with_id() {
        let err = ClaroError::NotFound {
            resource: "User".to_string(),
            id: Some("u_123".to_string()),
        };
        assert_eq!(err.to_string(), "User not found: u_123");
    }

    #[test]
    fn test_not_found_display_without_id() {
        let err = ClaroError::NotFound {
            resource: "User".to_string(),
            id: None,
        };
        assert_eq!(err.to_string(), "User not found");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ClaroError::ValidationError {
            field: "email".to_string(),
            message: "must not be empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Validation error on field 'email': must not be empty"
        );
    }
}
