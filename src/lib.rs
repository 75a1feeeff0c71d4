//! # Planning Center API Rust SDK
//!
//! A Rust SDK for the Planning Center Online API, providing a typed async
//! HTTP client, automatic rate-limit pacing, retry with backoff, pagination
//! helpers, and dependency-aware batch execution over the JSON:API surface.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`PcoConfig`] and [`PcoConfigBuilder`]
//! - OAuth bearer and personal-access-token authentication via [`AuthConfig`]
//! - An async HTTP client with error classification via [`clients::HttpClient`]
//! - Server-advertised rate-limit pacing via [`clients::RateLimiter`]
//! - Lifecycle event emission via [`clients::EventBus`]
//! - Retry with exponential backoff via [`retry`]
//! - Sequential, parallel, and streaming pagination via [`pagination`]
//! - Dependency-aware batch mutations via [`batch`]
//!
//! ## Quick Start
//!
//! ```rust
//! use pco_api::{AuthConfig, PcoConfig};
//!
//! // Create configuration using the builder pattern
//! let config = PcoConfig::builder()
//!     .auth(AuthConfig::personal_access_token("app-id", "secret").unwrap())
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Making API Requests
//!
//! ```rust,ignore
//! use pco_api::{AuthConfig, PcoConfig};
//! use pco_api::clients::{HttpClient, HttpMethod, HttpRequest, ParamValue};
//!
//! let config = PcoConfig::builder()
//!     .auth(AuthConfig::oauth("access-token")?)
//!     .build()?;
//!
//! let client = HttpClient::new(config);
//!
//! let request = HttpRequest::builder(HttpMethod::Get, "/people/v2/people")
//!     .param("where[first_name]", ParamValue::value("Jean"))
//!     .param("include", ParamValue::list(vec!["emails".into(), "addresses".into()]))
//!     .build()?;
//!
//! let response = client.request(request).await?;
//! ```
//!
//! ## Fetching Every Page
//!
//! ```rust,ignore
//! use pco_api::pagination::{PageOptions, Paginator};
//!
//! let paginator = Paginator::new(&client);
//! let set = paginator
//!     .get_all_pages("/people/v2/people", Vec::new(), PageOptions::default())
//!     .await?;
//! println!("fetched {} of {}", set.data.len(), set.total_count);
//! ```
//!
//! ## Retrying Transient Failures
//!
//! ```rust,ignore
//! use pco_api::retry::{retry_with_backoff, RetryOptions};
//!
//! let response = retry_with_backoff(
//!     || client.request(request.clone()),
//!     &RetryOptions::default(),
//! )
//! .await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: Credentials and URLs validate on construction
//! - **Thread-safe**: All types are `Send + Sync`
//! - **Async-first**: Designed for use with Tokio async runtime
//! - **Classified errors**: Every failure carries a category, severity, and
//!   retryability verdict

pub mod batch;
pub mod clients;
pub mod config;
pub mod error;
pub mod jsonapi;
pub mod pagination;
pub mod retry;

// Re-export public types at crate root for convenience
pub use config::{AuthConfig, PcoConfig, PcoConfigBuilder, DEFAULT_BASE_URL};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    ClientEvent, ClientRegistry, ErrorCategory, ErrorSeverity, EventBus, EventKind, HttpClient,
    HttpError, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse, InvalidRequestError,
    ParamValue, PcoApiError, RateLimiter,
};

// Re-export retry, pagination, and batch types for convenience
pub use batch::{
    BatchExecutor, BatchOperation, BatchOperationType, BatchOptions, BatchResult, BatchSummary,
};
pub use pagination::{PageOptions, PageSet, Paginator};
pub use retry::{
    retry_for_match, retry_with_backoff, retry_with_backoff_observed, MatchRetryOptions,
    RetryOptions,
};
