//! HTTP client types for Planning Center API communication.
//!
//! This module provides the foundational HTTP layer that every higher-level
//! operation funnels through. It handles request construction, error
//! classification, rate-limit pacing, and lifecycle event emission.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`HttpClient`]: The async HTTP client for API communication
//! - [`HttpRequest`]: A request descriptor to be sent to the API
//! - [`HttpResponse`]: The response envelope for a settled request
//! - [`PcoApiError`] / [`HttpError`]: Classified failure types
//! - [`RateLimiter`]: Server-advertised quota pacing
//! - [`EventBus`] / [`ClientEvent`]: The observability side channel
//! - [`ClientRegistry`]: An application-owned cache of configured clients
//!
//! # Example
//!
//! ```rust,ignore
//! use pco_api::{AuthConfig, PcoConfig};
//! use pco_api::clients::{HttpClient, HttpMethod, HttpRequest};
//!
//! let config = PcoConfig::builder()
//!     .auth(AuthConfig::personal_access_token("app-id", "secret")?)
//!     .build()?;
//!
//! let client = HttpClient::new(config);
//! let request = HttpRequest::builder(HttpMethod::Get, "/people/v2/people")
//!     .build()?;
//!
//! let response = client.request(request).await?;
//! ```
//!
//! # Error Propagation
//!
//! The client classifies failures and rethrows them; it never recovers an
//! error locally. The retry engine in [`crate::retry`] is the only component
//! permitted to swallow-and-retry, and only for retryable categories.

mod errors;
mod events;
mod http_client;
mod http_request;
mod http_response;
mod rate_limit;
mod registry;

pub use errors::{
    should_not_retry, ErrorCategory, ErrorSeverity, HttpError, InvalidRequestError, PcoApiError,
};
pub use events::{ClientEvent, EventBus, EventKind};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{
    serialize_params, HttpMethod, HttpRequest, HttpRequestBuilder, ParamValue,
};
pub use http_response::{HttpResponse, RateLimitHeaders};
pub use rate_limit::{RateLimitState, RateLimiter};
pub use registry::ClientRegistry;
