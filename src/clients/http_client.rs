//! HTTP client for Planning Center API communication.
//!
//! This module provides the [`HttpClient`] type that every higher-level
//! operation funnels through: it builds authenticated requests, paces
//! itself against the server-advertised rate limit, classifies failures,
//! and emits lifecycle events for observability.

use std::collections::HashMap;
use std::time::Instant;

use crate::clients::errors::{HttpError, PcoApiError};
use crate::clients::events::{ClientEvent, EventBus};
use crate::clients::http_request::{serialize_params, HttpMethod, HttpRequest};
use crate::clients::http_response::{HttpResponse, RateLimitHeaders};
use crate::clients::rate_limit::RateLimiter;
use crate::config::PcoConfig;

/// Library version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Async HTTP client for the Planning Center API.
///
/// The client handles:
/// - URL resolution (relative endpoints joined to the base URL, absolute
///   pagination URLs used verbatim)
/// - Default headers including `Authorization` from the configured credential
/// - Rate-limit pacing from `X-PCO-API-Request-Rate-*` headers
/// - Deterministic error classification
/// - `request:start` / `request:complete` / `request:error` event emission
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use pco_api::{AuthConfig, PcoConfig};
/// use pco_api::clients::{HttpClient, HttpMethod, HttpRequest};
///
/// let config = PcoConfig::builder()
///     .auth(AuthConfig::oauth("access-token")?)
///     .build()?;
///
/// let client = HttpClient::new(config);
///
/// let request = HttpRequest::builder(HttpMethod::Get, "/people/v2/people")
///     .query_param("per_page", "25")
///     .build()?;
///
/// let response = client.request(request).await?;
/// println!("{}", response.data);
/// ```
#[derive(Debug)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// The client configuration.
    config: PcoConfig,
    /// Quota state mirrored from response headers; owned by this client.
    rate_limiter: RateLimiter,
    /// Lifecycle event sink for this client.
    events: EventBus,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client from the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS
    /// initialization failure).
    #[must_use]
    pub fn new(config: PcoConfig) -> Self {
        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().expect("Failed to create HTTP client");

        Self {
            client,
            config,
            rate_limiter: RateLimiter::new(),
            events: EventBus::new(),
        }
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &PcoConfig {
        &self.config
    }

    /// Returns the event bus for registering observability handlers.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Returns the rate limiter owned by this client.
    #[must_use]
    pub const fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Sends a request to the Planning Center API.
    ///
    /// Emits exactly one `request:start` event before dispatch and exactly
    /// one terminal event after the call settles, sharing one `request_id`.
    /// The client never recovers an error locally; retry policy belongs to
    /// [`retry_with_backoff`](crate::retry::retry_with_backoff).
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidRequest`] if the request fails validation,
    /// or [`HttpError::Api`] for non-2xx responses and transport failures
    /// (classified as Network, status 0).
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = self.resolve_url(&request);
        let request_id = generate_request_id();

        self.events.emit(&ClientEvent::RequestStart {
            endpoint: request.endpoint.clone(),
            method: request.method,
            request_id: request_id.clone(),
        });

        self.rate_limiter.wait_for_slot().await;

        let started = Instant::now();
        let result = self.dispatch(&request, &url).await;
        let duration = started.elapsed();

        match result {
            Ok((status, status_text, headers, body)) => {
                // Most recent response wins, success or failure.
                self.rate_limiter
                    .update_from_headers(&RateLimitHeaders::from_headers(&headers));

                if (200..=299).contains(&status) {
                    self.events.emit(&ClientEvent::RequestComplete {
                        status,
                        duration,
                        request_id: request_id.clone(),
                    });
                    return Ok(HttpResponse {
                        data: body,
                        status,
                        headers,
                        request_id,
                        duration,
                    });
                }

                let error = PcoApiError::from_response(
                    status,
                    &status_text,
                    &body,
                    &headers,
                    &request.endpoint,
                    request.method,
                );
                self.emit_error(&error);
                Err(HttpError::Api(error))
            }
            Err(error) => {
                self.emit_error(&error);
                Err(HttpError::Api(error))
            }
        }
    }

    /// Builds and sends the reqwest request, returning the raw parts.
    async fn dispatch(
        &self,
        request: &HttpRequest,
        url: &str,
    ) -> Result<(u16, String, HashMap<String, Vec<String>>, serde_json::Value), PcoApiError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Patch => self.client.patch(url),
            HttpMethod::Put => self.client.put(url),
            HttpMethod::Delete => self.client.delete(url),
        };

        builder = builder
            .header("Accept", "application/json")
            .header("User-Agent", user_agent())
            .header("Authorization", self.config.auth().authorization_header());

        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                builder = builder.header(key, value);
            }
        }

        if !request.params.is_empty() {
            builder = builder.query(&serialize_params(&request.params));
        }

        if let Some(body) = &request.body {
            // reqwest's json() also sets Content-Type: application/json.
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.transport_error(&e, request))?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string();
        let headers = parse_response_headers(response.headers());
        // Reading the body can still fail mid-transfer (connection reset,
        // truncation); that is a transport failure, not an empty body.
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(&e, request))?;

        let body = if text.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(serde_json::Value::Null)
        };

        Ok((status, status_text, headers, body))
    }

    /// Wraps a transport failure into a Network-classified error.
    fn transport_error(&self, error: &reqwest::Error, request: &HttpRequest) -> PcoApiError {
        let message = if error.is_timeout() {
            let timeout = self
                .config
                .timeout()
                .map_or(0, |t| t.as_millis());
            format!("Request timed out after {timeout}ms")
        } else {
            format!("Network error: {error}")
        };
        PcoApiError::network(message, &request.endpoint, request.method)
    }

    fn emit_error(&self, error: &PcoApiError) {
        self.events.emit(&ClientEvent::RequestError {
            category: error.category,
            status: error.status,
            message: error.message.clone(),
            endpoint: error.endpoint.clone(),
            method: error.method,
        });
    }

    /// Resolves the final URL: absolute endpoints pass through verbatim,
    /// relative paths join the configured base URL.
    fn resolve_url(&self, request: &HttpRequest) -> String {
        if request.is_absolute() {
            return request.endpoint.clone();
        }
        let endpoint = request.endpoint.trim_start_matches('/');
        format!("{}/{}", self.config.base_url(), endpoint)
    }
}

/// Builds the User-Agent header value.
fn user_agent() -> String {
    let rust_version = env!("CARGO_PKG_RUST_VERSION");
    format!("Planning Center API Library v{SDK_VERSION} | Rust {rust_version}")
}

/// Generates a per-call correlation ID.
fn generate_request_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}

/// Parses response headers into a map with lowercased names.
fn parse_response_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, Vec<String>> {
    let mut result: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in headers {
        let key = name.as_str().to_lowercase();
        let value = value.to_str().unwrap_or_default().to_string();
        result.entry(key).or_default().push(value);
    }
    result
}
