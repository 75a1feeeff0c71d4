//! Error types for client configuration.
//!
//! This module contains error types used for configuration and validation
//! errors. HTTP-level errors live in [`crate::clients::errors`].
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use pco_api::{ConfigError, PcoConfig};
//!
//! let result = PcoConfig::builder().build();
//! assert!(matches!(result, Err(ConfigError::MissingRequiredField { field: "auth" })));
//! ```

use thiserror::Error;

/// Errors that can occur during client configuration.
///
/// This enum represents all possible errors that can occur when creating
/// or validating configuration types. Each variant provides a clear,
/// actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// An auth credential is empty.
    #[error("Auth credential '{field}' cannot be empty. Please provide a valid Planning Center credential.")]
    EmptyCredential {
        /// The name of the empty credential field.
        field: &'static str,
    },

    /// Base URL is invalid.
    #[error("Invalid base URL '{url}'. Please provide an absolute URL with scheme (e.g., 'https://api.planningcenteronline.com').")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_field_error_message() {
        let error = ConfigError::MissingRequiredField { field: "auth" };
        let message = error.to_string();
        assert!(message.contains("auth"));
        assert!(message.contains("must be set"));
    }

    #[test]
    fn test_empty_credential_error_message() {
        let error = ConfigError::EmptyCredential {
            field: "access_token",
        };
        let message = error.to_string();
        assert!(message.contains("access_token"));
        assert!(message.contains("cannot be empty"));
    }

    #[test]
    fn test_invalid_base_url_error_message() {
        let error = ConfigError::InvalidBaseUrl {
            url: "not-a-url".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("not-a-url"));
        assert!(message.contains("absolute URL"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::MissingRequiredField { field: "auth" };
        let _: &dyn std::error::Error = &error;
    }
}
