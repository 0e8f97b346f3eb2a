// # Rate Limiter
//
// Token bucket gating outbound requests to the upstream service.
//
// ## Semantics
//
// - One permit is granted every `period`
// - Up to `burst` permits can be taken back to back from a full bucket
// - The bucket starts full
//
// The limiter is created once per provider configuration and shared by
// reference between all lookups using it. Synchronization is internal
// (governor's lock-free GCRA state), so concurrent `acquire` calls are safe.

use crate::error::{Error, Result};
use crate::traits::Throttle;
use async_trait::async_trait;
use governor::{
    Quota, RateLimiter as Gcra,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::time::Duration;
use tokio::time::Instant;

/// Token bucket rate limiter
pub struct RateLimiter {
    /// GCRA limiter holding the bucket state
    inner: Gcra<NotKeyed, InMemoryState, DefaultClock>,

    /// Time between permit grants
    period: Duration,

    /// Bucket capacity
    burst: NonZeroU32,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Parameters
    ///
    /// - `period`: Time between permit grants, must not be zero
    /// - `burst`: Bucket capacity, must be at least 1
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero period or a zero burst.
    pub fn new(period: Duration, burst: u32) -> Result<Self> {
        let burst = NonZeroU32::new(burst).ok_or_else(|| {
            Error::config("The rate_limit_burst value '0' must be bigger than 0")
        })?;

        let quota = Quota::with_period(period)
            .ok_or_else(|| Error::config("The rate_limit_rate value must not be zero"))?
            .allow_burst(burst);

        Ok(Self {
            inner: Gcra::direct(quota),
            period,
            burst,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn burst(&self) -> u32 {
        self.burst.get()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("period", &self.period)
            .field("burst", &self.burst)
            .finish()
    }
}

#[async_trait]
impl Throttle for RateLimiter {
    fn try_acquire(&self) -> bool {
        self.inner.check().is_ok()
    }

    async fn acquire(&self, deadline: Instant) -> Result<()> {
        if self.try_acquire() {
            return Ok(());
        }

        tracing::debug!(
            "The rate limit may be triggered, waiting for a permit (period={:?}, burst={})",
            self.period,
            self.burst
        );

        tokio::time::timeout_at(deadline, self.inner.until_ready())
            .await
            .map_err(|_| {
                Error::rate_limit_timeout(format!(
                    "no permit available within the deadline (period={:?}, burst={})",
                    self.period, self.burst
                ))
            })
    }
}
