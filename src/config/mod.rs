//! Configuration types for the Planning Center API client.
//!
//! This module provides the core configuration types used to initialize
//! the client for API communication with Planning Center Online.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`PcoConfig`]: The main configuration struct holding all client settings
//! - [`PcoConfigBuilder`]: A builder for constructing [`PcoConfig`] instances
//! - [`AuthConfig`]: The tagged union of supported credential styles
//!
//! # Example
//!
//! ```rust
//! use pco_api::{AuthConfig, PcoConfig};
//! use std::time::Duration;
//!
//! let config = PcoConfig::builder()
//!     .auth(AuthConfig::oauth("my-access-token").unwrap())
//!     .timeout(Duration::from_secs(30))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_url(), "https://api.planningcenteronline.com");
//! ```

mod auth;

pub use auth::AuthConfig;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::error::ConfigError;
use crate::retry::RetryOptions;

/// Default base URL for the Planning Center API.
pub const DEFAULT_BASE_URL: &str = "https://api.planningcenteronline.com";

/// Configuration for the Planning Center API client.
///
/// This struct holds all configuration needed for client operations,
/// including credentials, the API base URL, the per-request timeout, and
/// retry tuning.
///
/// # Thread Safety
///
/// `PcoConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
///
/// # Example
///
/// ```rust
/// use pco_api::{AuthConfig, PcoConfig};
///
/// let config = PcoConfig::builder()
///     .auth(AuthConfig::personal_access_token("app-id", "secret").unwrap())
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct PcoConfig {
    auth: AuthConfig,
    base_url: String,
    timeout: Option<Duration>,
    retry: RetryOptions,
}

// Verify PcoConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PcoConfig>();
};

impl PcoConfig {
    /// Creates a new builder for constructing a `PcoConfig`.
    #[must_use]
    pub fn builder() -> PcoConfigBuilder {
        PcoConfigBuilder::new()
    }

    /// Returns the auth configuration.
    #[must_use]
    pub const fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    /// Returns the base URL for API requests.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the per-request timeout, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the retry options used by the retry engine.
    #[must_use]
    pub const fn retry(&self) -> &RetryOptions {
        &self.retry
    }

    /// Returns a stable hash identifying this configuration.
    ///
    /// Two configs with the same credentials, base URL, timeout, and retry
    /// settings produce the same key. Used by
    /// [`ClientRegistry`](crate::clients::ClientRegistry) to reuse clients.
    #[must_use]
    pub fn cache_key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.auth.cache_key_part().hash(&mut hasher);
        self.base_url.hash(&mut hasher);
        self.timeout.hash(&mut hasher);
        self.retry.max_retries.hash(&mut hasher);
        self.retry.base_delay.hash(&mut hasher);
        self.retry.max_delay.hash(&mut hasher);
        hasher.finish()
    }
}

/// Builder for constructing [`PcoConfig`] instances.
///
/// The only required field is `auth`. All other fields have defaults.
///
/// # Defaults
///
/// - `base_url`: [`DEFAULT_BASE_URL`]
/// - `timeout`: `None` (no client-side timeout)
/// - `retry`: [`RetryOptions::default`]
///
/// # Example
///
/// ```rust
/// use pco_api::{AuthConfig, PcoConfig, RetryOptions};
/// use std::time::Duration;
///
/// let config = PcoConfig::builder()
///     .auth(AuthConfig::oauth("token").unwrap())
///     .base_url("https://api.planningcenteronline.com")
///     .timeout(Duration::from_secs(10))
///     .retry(RetryOptions::default())
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct PcoConfigBuilder {
    auth: Option<AuthConfig>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    retry: Option<RetryOptions>,
}

impl PcoConfigBuilder {
    /// Creates a new builder with no fields set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the auth configuration (required).
    #[must_use]
    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets the base URL for API requests.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the retry options.
    #[must_use]
    pub const fn retry(mut self, retry: RetryOptions) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Builds the [`PcoConfig`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `auth` was not set,
    /// or [`ConfigError::InvalidBaseUrl`] if the base URL is not an absolute
    /// http(s) URL.
    pub fn build(self) -> Result<PcoConfig, ConfigError> {
        let auth = self
            .auth
            .ok_or(ConfigError::MissingRequiredField { field: "auth" })?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidBaseUrl { url: base_url });
        }
        // Normalize away a trailing slash so endpoint joining is uniform.
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(PcoConfig {
            auth,
            base_url,
            timeout: self.timeout,
            retry: self.retry.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_auth() -> AuthConfig {
        AuthConfig::oauth("test-token").unwrap()
    }

    #[test]
    fn test_build_requires_auth() {
        let result = PcoConfig::builder().build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "auth" })
        ));
    }

    #[test]
    fn test_default_base_url() {
        let config = PcoConfig::builder().auth(test_auth()).build().unwrap();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let config = PcoConfig::builder()
            .auth(test_auth())
            .base_url("https://example.test/")
            .build()
            .unwrap();
        assert_eq!(config.base_url(), "https://example.test");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = PcoConfig::builder()
            .auth(test_auth())
            .base_url("ftp://example.test")
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_cache_key_stable_for_equal_configs() {
        let a = PcoConfig::builder().auth(test_auth()).build().unwrap();
        let b = PcoConfig::builder().auth(test_auth()).build().unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_differs_by_credential() {
        let a = PcoConfig::builder().auth(test_auth()).build().unwrap();
        let b = PcoConfig::builder()
            .auth(AuthConfig::oauth("other-token").unwrap())
            .build()
            .unwrap();
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PcoConfig>();
    }
}
