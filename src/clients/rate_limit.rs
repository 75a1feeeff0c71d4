//! Rate-limit pacing against server-advertised quota state.
//!
//! Planning Center reports `{limit, count, period}` on every response. The
//! limiter mirrors that state and suspends callers when the window is
//! exhausted. State is scoped to one limiter instance, owned by one
//! [`HttpClient`](crate::clients::HttpClient); unrelated clients are never
//! blocked by each other.

use std::sync::Mutex;
use std::time::Duration;

use crate::clients::http_response::RateLimitHeaders;

/// Mirrored quota state from the most recent response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RateLimitState {
    /// Requests allowed per period.
    pub limit: u32,
    /// Requests used in the current period.
    pub count: u32,
    /// Period length in seconds.
    pub period: u64,
}

/// Tracks server-reported quota and computes wait times.
///
/// `update_from_headers` takes each field from the most recent response that
/// carried it; partial header sets leave the missing fields at their previous
/// values. `wait_for_slot` suspends while the window is exhausted, re-checking
/// after each sleep so a refreshed state releases exactly the requests the new
/// window allows.
#[derive(Debug, Default)]
pub struct RateLimiter {
    state: Mutex<RateLimitState>,
}

impl RateLimiter {
    /// Creates a limiter with an empty (unconstrained) state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the current state.
    ///
    /// # Panics
    ///
    /// Panics if the state lock is poisoned, which requires a prior panic
    /// while holding it.
    #[must_use]
    pub fn state(&self) -> RateLimitState {
        *self.state.lock().expect("rate limit state lock poisoned")
    }

    /// Overwrites state from the most recent response's headers.
    ///
    /// Only headers actually present overwrite their field; state is never
    /// merged across requests beyond that.
    pub fn update_from_headers(&self, headers: &RateLimitHeaders) {
        if let Ok(mut state) = self.state.lock() {
            if let Some(limit) = headers.limit {
                state.limit = limit;
            }
            if let Some(count) = headers.count {
                state.count = count;
            }
            if let Some(period) = headers.period {
                state.period = period;
            }
        }
    }

    /// Suspends until the advertised window has room for one more request.
    ///
    /// Returns immediately while `count < limit` or no limit is known.
    /// When the window is exhausted, sleeps for the advertised period and
    /// re-checks, so concurrent waiters released by a stale snapshot cannot
    /// stampede a still-exhausted window.
    pub async fn wait_for_slot(&self) {
        loop {
            let snapshot = self.state();
            if snapshot.limit == 0 || snapshot.count < snapshot.limit {
                return;
            }

            let wait = Duration::from_secs(snapshot.period.max(1));
            tracing::debug!(
                count = snapshot.count,
                limit = snapshot.limit,
                wait_secs = wait.as_secs(),
                "rate limit window exhausted, waiting"
            );
            tokio::time::sleep(wait).await;

            // The sleep counts as a fresh window; without a newer response
            // to refresh the count, assume the period rolled over.
            if let Ok(mut state) = self.state.lock() {
                if state.count >= state.limit && state.limit > 0 {
                    state.count = 0;
                }
            }
        }
    }

    /// Alias for [`wait_for_slot`](Self::wait_for_slot).
    pub async fn wait_for_availability(&self) {
        self.wait_for_slot().await;
    }
}
