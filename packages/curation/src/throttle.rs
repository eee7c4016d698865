//! Request pacing.
//!
//! Third-party services (search API, page fetches, providers) all want a
//! gentle cadence. A governor rate limiter replaces fixed sleeps: the
//! effective request rate stays the same, but waiting only happens when a
//! request would actually exceed the quota.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;

type DirectLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Shared pacer for all outbound network calls.
#[derive(Clone)]
pub struct RequestPacer {
    limiter: Arc<DirectLimiter>,
}

impl RequestPacer {
    /// Pace to `requests_per_second` sustained. Zero falls back to 1 rps.
    ///
    /// Burst is pinned to one so permits come out evenly spaced, matching
    /// the steady inter-request delay the services expect.
    pub fn new(requests_per_second: u32) -> Self {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(nonzero!(1u32));
        let quota = Quota::per_second(rate).allow_burst(nonzero!(1u32));
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// An effectively unthrottled pacer, for tests and mock-backed runs.
    pub fn unlimited() -> Self {
        Self::new(1_000_000)
    }

    /// Wait until the next request is within quota.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn paces_successive_acquires() {
        let pacer = RequestPacer::new(10);
        let start = Instant::now();
        for _ in 0..3 {
            pacer.acquire().await;
        }
        // First permit is immediate, the next two wait ~100ms each.
        assert!(start.elapsed().as_millis() >= 150);
    }

    #[tokio::test]
    async fn unlimited_does_not_block() {
        let pacer = RequestPacer::unlimited();
        let start = Instant::now();
        for _ in 0..50 {
            pacer.acquire().await;
        }
        assert!(start.elapsed().as_millis() < 500);
    }
}
