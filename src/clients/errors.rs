//! Error taxonomy for Planning Center API failures.
//!
//! Every HTTP or network failure is classified deterministically into a
//! category with a severity and a retryable flag. The classification table:
//!
//! | status   | category       | retryable | severity    |
//! |----------|----------------|-----------|-------------|
//! | 401      | Authentication | no        | High        |
//! | 403      | Authorization  | no        | High        |
//! | 429      | RateLimit      | yes       | Medium      |
//! | 400, 422 | Validation     | no        | Low         |
//! | 0, 408   | Network        | yes       | Medium      |
//! | 500      | ExternalApi    | yes       | High        |
//! | >500     | ExternalApi    | yes       | Medium      |
//! | other    | Unknown        | no        | Medium      |
//!
//! The retry engine consults [`should_not_retry`] rather than the flag
//! directly: statuses 400, 401, 403, and 422 are never retried regardless
//! of how the error was constructed.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

use crate::clients::http_request::HttpMethod;
use crate::clients::http_response::RateLimitHeaders;
use crate::jsonapi::ErrorObject;

/// Failure category assigned by classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Credentials missing or rejected (401).
    Authentication,
    /// Credentials valid but access denied (403).
    Authorization,
    /// Server-advertised quota exceeded (429).
    RateLimit,
    /// The request payload was rejected (400, 422).
    Validation,
    /// The remote service failed (5xx).
    ExternalApi,
    /// Transport failure or timeout (status 0, 408).
    Network,
    /// Anything else.
    Unknown,
}

/// Severity attached to a classified error, for log triage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Caller mistake; fix the request.
    Low,
    /// Transient or unexpected; worth watching.
    Medium,
    /// Credential or upstream outage; page someone.
    High,
}

const fn classify(status: u16) -> (ErrorCategory, bool, ErrorSeverity) {
    match status {
        401 => (ErrorCategory::Authentication, false, ErrorSeverity::High),
        403 => (ErrorCategory::Authorization, false, ErrorSeverity::High),
        429 => (ErrorCategory::RateLimit, true, ErrorSeverity::Medium),
        400 | 422 => (ErrorCategory::Validation, false, ErrorSeverity::Low),
        0 | 408 => (ErrorCategory::Network, true, ErrorSeverity::Medium),
        500 => (ErrorCategory::ExternalApi, true, ErrorSeverity::High),
        s if s > 500 => (ErrorCategory::ExternalApi, true, ErrorSeverity::Medium),
        _ => (ErrorCategory::Unknown, false, ErrorSeverity::Medium),
    }
}

/// Default retry delay for a category, used when no `Retry-After` was sent.
const fn default_retry_delay(category: ErrorCategory) -> Duration {
    match category {
        ErrorCategory::RateLimit => Duration::from_secs(10),
        ErrorCategory::ExternalApi => Duration::from_secs(5),
        ErrorCategory::Network => Duration::from_secs(2),
        _ => Duration::from_secs(1),
    }
}

/// A classified Planning Center API error.
///
/// Carries the HTTP status, the raw JSON:API `errors` array, the rate-limit
/// headers snapshot at failure time, and the request context. Callers should
/// branch on [`category`](Self::category) or [`status`](Self::status), not
/// on message text.
///
/// # Example
///
/// ```rust
/// use pco_api::clients::{ErrorCategory, HttpMethod, PcoApiError};
/// use std::collections::HashMap;
/// use serde_json::json;
///
/// let error = PcoApiError::from_response(
///     401,
///     "Unauthorized",
///     &json!({"errors": [{"detail": "Token expired"}]}),
///     &HashMap::new(),
///     "/people/v2/people",
///     HttpMethod::Get,
/// );
///
/// assert_eq!(error.category, ErrorCategory::Authentication);
/// assert_eq!(error.message, "Token expired");
/// assert!(!error.retryable);
/// ```
#[derive(Clone, Debug, Error)]
#[error("{message} ({method} {endpoint}: status {status})")]
pub struct PcoApiError {
    /// The HTTP status code; 0 for transport-level failures.
    pub status: u16,
    /// The HTTP status text, or a transport description.
    pub status_text: String,
    /// Human-readable message from the first JSON:API error's `detail` or
    /// `title`, falling back to the status text.
    pub message: String,
    /// The raw JSON:API `errors` array, when the body carried one.
    pub errors: Vec<ErrorObject>,
    /// Rate-limit headers at the time of failure.
    pub rate_limit: RateLimitHeaders,
    /// The endpoint the failing request targeted.
    pub endpoint: String,
    /// The HTTP method of the failing request.
    pub method: HttpMethod,
    /// The classified category.
    pub category: ErrorCategory,
    /// The classified severity.
    pub severity: ErrorSeverity,
    /// Whether the category is retryable. Prefer [`should_not_retry`].
    pub retryable: bool,
}

impl PcoApiError {
    /// Builds a classified error from a non-2xx response.
    ///
    /// The message is taken from the first JSON:API error's `detail`, then
    /// its `title`, then the status text.
    #[must_use]
    pub fn from_response(
        status: u16,
        status_text: &str,
        body: &serde_json::Value,
        headers: &HashMap<String, Vec<String>>,
        endpoint: &str,
        method: HttpMethod,
    ) -> Self {
        let errors: Vec<ErrorObject> = body
            .get("errors")
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();

        let message = errors
            .first()
            .and_then(|e| e.detail.clone().or_else(|| e.title.clone()))
            .unwrap_or_else(|| status_text.to_string());

        let (category, retryable, severity) = classify(status);

        Self {
            status,
            status_text: status_text.to_string(),
            message,
            errors,
            rate_limit: RateLimitHeaders::from_headers(headers),
            endpoint: endpoint.to_string(),
            method,
            category,
            severity,
            retryable,
        }
    }

    /// Builds a Network-category error for a transport failure (status 0).
    #[must_use]
    pub fn network(message: impl Into<String>, endpoint: &str, method: HttpMethod) -> Self {
        let message = message.into();
        let (category, retryable, severity) = classify(0);
        Self {
            status: 0,
            status_text: message.clone(),
            message,
            errors: Vec::new(),
            rate_limit: RateLimitHeaders::default(),
            endpoint: endpoint.to_string(),
            method,
            category,
            severity,
            retryable,
        }
    }

    /// Returns the delay to wait before retrying this error.
    ///
    /// Honors the `Retry-After` header when it was captured; otherwise falls
    /// back to a category-based default.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        self.rate_limit
            .retry_after
            .map_or_else(|| default_retry_delay(self.category), Duration::from_secs)
    }
}

/// Error returned when a request fails validation before dispatch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidRequestError {
    /// The endpoint was empty or whitespace.
    #[error("Endpoint cannot be empty.")]
    EmptyEndpoint,
}

/// Unified error type for all client operations.
///
/// Transport failures are wrapped into a Network-category [`PcoApiError`]
/// rather than surfaced as raw transport errors, so callers branch on one
/// taxonomy everywhere.
///
/// # Example
///
/// ```rust,ignore
/// match client.request(request).await {
///     Ok(response) => println!("{}", response.data),
///     Err(HttpError::Api(e)) => eprintln!("{:?} ({}): {}", e.category, e.status, e.message),
///     Err(HttpError::InvalidRequest(e)) => eprintln!("bad request: {e}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum HttpError {
    /// A classified API or network failure.
    #[error(transparent)]
    Api(#[from] PcoApiError),

    /// Request validation failed before dispatch.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidRequestError),

    /// A 2xx body could not be decoded as a JSON:API document.
    #[error("Failed to decode JSON:API document: {0}")]
    Decode(#[from] serde_json::Error),
}

impl HttpError {
    /// Returns the HTTP status, if this is a classified API error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(e) => Some(e.status),
            Self::InvalidRequest(_) | Self::Decode(_) => None,
        }
    }

    /// Returns the category, if this is a classified API error.
    #[must_use]
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Api(e) => Some(e.category),
            Self::InvalidRequest(_) | Self::Decode(_) => None,
        }
    }
}

/// Returns `true` if the retry engine must not retry this error.
///
/// Statuses 400, 401, 403, and 422 form a fixed denylist that wins over the
/// error's own retryable flag. Validation-before-dispatch errors are never
/// retried. Everything else defers to the flag.
#[must_use]
pub fn should_not_retry(error: &HttpError) -> bool {
    match error {
        HttpError::Api(e) => matches!(e.status, 400 | 401 | 403 | 422) || !e.retryable,
        HttpError::InvalidRequest(_) | HttpError::Decode(_) => true,
    }
}
