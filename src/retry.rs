//! Retry engine with exponential backoff.
//!
//! [`retry_with_backoff`] wraps an arbitrary asynchronous operation and
//! retries classified failures: non-retryable errors (per
//! [`should_not_retry`]) and exhausted attempts rethrow the original error
//! immediately, with no wasted delay. Rate-limit errors wait the delay the
//! server asked for; everything else backs off exponentially.
//!
//! [`retry_for_match`] is the specialized variant used by person-matching
//! flows, where "no match found yet" can mean the remote search index has
//! not caught up with a recent write.

use std::future::Future;
use std::time::Duration;

use crate::clients::{should_not_retry, ErrorCategory, HttpError};

/// Tuning for [`retry_with_backoff`].
///
/// The delay before attempt `n + 1` is
/// `min(base_delay * backoff_multiplier^(n-1), max_delay)`, except for
/// rate-limit errors, which use the server-advertised delay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryOptions {
    /// Total attempts allowed, including the first.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any computed delay.
    pub max_delay: Duration,
    /// Growth factor between consecutive delays.
    pub backoff_multiplier: f64,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryOptions {
    /// Computes the exponential delay after the given (1-based) attempt.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let scaled = self.base_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent as i32);
        Duration::from_secs_f64(scaled).min(self.max_delay)
    }
}

/// Retries `operation` with exponential backoff.
///
/// Equivalent to [`retry_with_backoff_observed`] with a no-op observer.
///
/// # Errors
///
/// Returns the operation's original error once it is non-retryable or
/// attempts are exhausted.
pub async fn retry_with_backoff<T, F, Fut>(
    operation: F,
    options: &RetryOptions,
) -> Result<T, HttpError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, HttpError>>,
{
    retry_with_backoff_observed(operation, options, |_, _| {}).await
}

/// Retries `operation`, invoking `on_retry(&error, attempt)` before each wait.
///
/// The observer is a side channel only; its behavior never alters control
/// flow. Attempt numbers are 1-based and count failed attempts, so an
/// operation that fails twice then succeeds observes attempts `[1, 2]`.
///
/// # Errors
///
/// Returns the operation's original error (never a retry wrapper) once it is
/// non-retryable or `options.max_retries` attempts have been made.
pub async fn retry_with_backoff_observed<T, F, Fut, O>(
    mut operation: F,
    options: &RetryOptions,
    mut on_retry: O,
) -> Result<T, HttpError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, HttpError>>,
    O: FnMut(&HttpError, u32),
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if should_not_retry(&error) || attempt >= options.max_retries.max(1) {
                    return Err(error);
                }

                // Rate-limit errors carry the delay the server asked for.
                let delay = match &error {
                    HttpError::Api(e) if e.category == ErrorCategory::RateLimit => e.retry_delay(),
                    _ => options.backoff_delay(attempt),
                };

                on_retry(&error, attempt);
                tracing::debug!(
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %error,
                    "retrying after failure"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Tuning for [`retry_for_match`].
///
/// The defaults encode an estimate of the remote search index's
/// eventual-consistency latency (tens of seconds). They are environment
/// tuning, not protocol guarantees; adjust them per deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchRetryOptions {
    /// Total match attempts allowed, including the first.
    pub max_retries: u32,
    /// Delay before the first re-check.
    pub base_delay: Duration,
    /// Upper bound on any computed delay.
    pub max_delay: Duration,
}

impl Default for MatchRetryOptions {
    fn default() -> Self {
        Self {
            max_retries: 4,
            base_delay: Duration::from_secs(15),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl MatchRetryOptions {
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let scaled = self.base_delay.as_secs_f64() * 2f64.powi(exponent as i32);
        Duration::from_secs_f64(scaled).min(self.max_delay)
    }
}

/// Re-runs a matching operation while it reports "no match yet".
///
/// `operation` yields `Ok(None)` when no match was found. That outcome is
/// re-checked with backoff only when contact-verification fields (email or
/// phone) were supplied **and** the caller is not going to create the record
/// on a miss; waiting is pointless when `create_if_not_found` is set, so the
/// first `None` returns immediately in that case.
///
/// # Errors
///
/// Classified errors from the operation propagate immediately; only the
/// "no match yet" outcome is retried.
pub async fn retry_for_match<T, F, Fut>(
    mut operation: F,
    options: &MatchRetryOptions,
    has_contact_fields: bool,
    create_if_not_found: bool,
) -> Result<Option<T>, HttpError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, HttpError>>,
{
    let wait_for_indexing = has_contact_fields && !create_if_not_found;

    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match operation().await? {
            Some(value) => return Ok(Some(value)),
            None => {
                if !wait_for_indexing || attempt >= options.max_retries.max(1) {
                    return Ok(None);
                }
                let delay = options.backoff_delay(attempt);
                tracing::debug!(
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "no match yet, waiting for remote indexing"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
