//! HTTP response types for the Planning Center API client.
//!
//! This module provides the [`HttpResponse`] envelope returned by every
//! successful request, plus [`RateLimitHeaders`] for the rate-limit state
//! Planning Center advertises on each response.

use std::collections::HashMap;
use std::time::Duration;

/// Rate-limit headers snapshot from a single response.
///
/// Planning Center reports quota state in the
/// `X-PCO-API-Request-Rate-{Limit,Count,Period}` headers, and `Retry-After`
/// on 429 responses. Header names are matched case-insensitively (the
/// client lowercases all header names on parse).
///
/// # Example
///
/// ```rust
/// use pco_api::clients::RateLimitHeaders;
/// use std::collections::HashMap;
///
/// let mut headers = HashMap::new();
/// headers.insert(
///     "x-pco-api-request-rate-limit".to_string(),
///     vec!["100".to_string()],
/// );
/// headers.insert(
///     "x-pco-api-request-rate-count".to_string(),
///     vec!["37".to_string()],
/// );
///
/// let snapshot = RateLimitHeaders::from_headers(&headers);
/// assert_eq!(snapshot.limit, Some(100));
/// assert_eq!(snapshot.count, Some(37));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RateLimitHeaders {
    /// Requests allowed per period (`X-PCO-API-Request-Rate-Limit`).
    pub limit: Option<u32>,
    /// Requests used this period (`X-PCO-API-Request-Rate-Count`).
    pub count: Option<u32>,
    /// Period length in seconds (`X-PCO-API-Request-Rate-Period`).
    pub period: Option<u64>,
    /// Seconds to wait before retrying (`Retry-After`).
    pub retry_after: Option<u64>,
}

impl RateLimitHeaders {
    /// Parses the rate-limit headers from a lowercased header map.
    #[must_use]
    pub fn from_headers(headers: &HashMap<String, Vec<String>>) -> Self {
        fn first_parsed<T: std::str::FromStr>(
            headers: &HashMap<String, Vec<String>>,
            name: &str,
        ) -> Option<T> {
            headers
                .get(name)
                .and_then(|values| values.first())
                .and_then(|value| value.trim().parse().ok())
        }

        Self {
            limit: first_parsed(headers, "x-pco-api-request-rate-limit"),
            count: first_parsed(headers, "x-pco-api-request-rate-count"),
            period: first_parsed(headers, "x-pco-api-request-rate-period"),
            retry_after: first_parsed(headers, "retry-after"),
        }
    }

    /// Returns `true` if any rate-limit header was present.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.limit.is_some()
            || self.count.is_some()
            || self.period.is_some()
            || self.retry_after.is_some()
    }
}

/// A response envelope from the Planning Center API.
///
/// Every successful [`request`](crate::clients::HttpClient::request) resolves
/// to one of these. `data` holds the parsed JSON body (`Null` for 204
/// responses); `request_id` correlates the envelope with the events emitted
/// for the same call.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The parsed response body; `Null` for empty bodies.
    pub data: serde_json::Value,
    /// The HTTP status code.
    pub status: u16,
    /// Response headers with lowercased names (headers may repeat).
    pub headers: HashMap<String, Vec<String>>,
    /// The client-generated correlation ID for this call.
    pub request_id: String,
    /// Wall-clock time from dispatch to settle.
    pub duration: Duration,
}

impl HttpResponse {
    /// Returns `true` if the status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status >= 200 && self.status <= 299
    }

    /// Returns the rate-limit headers snapshot for this response.
    #[must_use]
    pub fn rate_limit(&self) -> RateLimitHeaders {
        RateLimitHeaders::from_headers(&self.headers)
    }

    /// Returns the first value of a header, matched against the lowercased name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(status: u16, headers: HashMap<String, Vec<String>>) -> HttpResponse {
        HttpResponse {
            data: json!({}),
            status,
            headers,
            request_id: "req-1".to_string(),
            duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_is_ok_for_2xx_only() {
        assert!(envelope(200, HashMap::new()).is_ok());
        assert!(envelope(204, HashMap::new()).is_ok());
        assert!(!envelope(301, HashMap::new()).is_ok());
        assert!(!envelope(404, HashMap::new()).is_ok());
        assert!(!envelope(500, HashMap::new()).is_ok());
    }

    #[test]
    fn test_rate_limit_headers_parsed() {
        let mut headers = HashMap::new();
        headers.insert(
            "x-pco-api-request-rate-limit".to_string(),
            vec!["100".to_string()],
        );
        headers.insert(
            "x-pco-api-request-rate-count".to_string(),
            vec!["99".to_string()],
        );
        headers.insert(
            "x-pco-api-request-rate-period".to_string(),
            vec!["20".to_string()],
        );

        let snapshot = envelope(200, headers).rate_limit();
        assert_eq!(snapshot.limit, Some(100));
        assert_eq!(snapshot.count, Some(99));
        assert_eq!(snapshot.period, Some(20));
        assert!(snapshot.retry_after.is_none());
        assert!(snapshot.is_present());
    }

    #[test]
    fn test_retry_after_parsed() {
        let mut headers = HashMap::new();
        headers.insert("retry-after".to_string(), vec!["12".to_string()]);

        let snapshot = envelope(429, headers).rate_limit();
        assert_eq!(snapshot.retry_after, Some(12));
    }

    #[test]
    fn test_missing_headers_yield_empty_snapshot() {
        let snapshot = envelope(200, HashMap::new()).rate_limit();
        assert_eq!(snapshot, RateLimitHeaders::default());
        assert!(!snapshot.is_present());
    }

    #[test]
    fn test_unparseable_header_value_ignored() {
        let mut headers = HashMap::new();
        headers.insert(
            "x-pco-api-request-rate-limit".to_string(),
            vec!["not-a-number".to_string()],
        );
        let snapshot = envelope(200, headers).rate_limit();
        assert!(snapshot.limit.is_none());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), vec!["application/json".to_string()]);
        let response = envelope(200, headers);
        assert_eq!(response.header("Content-Type"), Some("application/json"));
    }
}
