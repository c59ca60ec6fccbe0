//! Request pacing using governor.
//!
//! The GCRA (Generic Cell Rate Algorithm) quota keeps a batch from bursting
//! past a store's published request rate; the batch itself is sequential so
//! no concurrency limit is needed.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Requests-per-minute limiter shared by clones.
///
/// A limiter built without a quota never waits.
///
/// # Example
///
/// ```rust,ignore
/// let limiter = RequestLimiter::per_minute(Some(500));
/// limiter.acquire().await;
/// let response = client.get(url).send().await?;
/// ```
#[derive(Clone, Default)]
pub struct RequestLimiter {
    rpm_limiter: Option<Arc<DirectRateLimiter>>,
}

impl RequestLimiter {
    /// Create a limiter allowing `rpm` requests per minute, or unlimited for `None`/0.
    pub fn per_minute(rpm: Option<u32>) -> Self {
        let rpm_limiter = rpm.and_then(NonZeroU32::new).map(|n| {
            let quota = Quota::per_minute(n);
            Arc::new(GovernorRateLimiter::direct(quota))
        });
        Self { rpm_limiter }
    }

    /// A limiter that never waits.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// True when a quota is configured.
    pub fn is_limited(&self) -> bool {
        self.rpm_limiter.is_some()
    }

    /// Wait until the quota allows one more request.
    pub async fn acquire(&self) {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.until_ready().await;
        }
    }

    /// Claim a request slot without waiting. Returns false if the quota is spent.
    pub fn try_acquire(&self) -> bool {
        match &self.rpm_limiter {
            Some(limiter) => limiter.check().is_ok(),
            None => true,
        }
    }
}

impl std::fmt::Debug for RequestLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestLimiter")
            .field("limited", &self.is_limited())
            .finish()
    }
}
