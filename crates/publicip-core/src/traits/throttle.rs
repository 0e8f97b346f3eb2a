//! Throttle trait
//!
//! The rate limiter is the only mutable state shared between lookups. It is
//! injected into [`crate::ProviderConfig`] as an `Arc<dyn Throttle>` so tests
//! and embedding hosts can substitute a deterministic implementation.

use async_trait::async_trait;
use tokio::time::Instant;

/// Trait for request gates
///
/// Implementations must be safe under concurrent `acquire` calls from
/// multiple lookups sharing one configuration.
#[async_trait]
pub trait Throttle: Send + Sync + std::fmt::Debug {
    /// Take a permit if one is available right now, without waiting
    ///
    /// A successful probe takes the permit. `acquire` may use it as its fast
    /// path and must not take a second one.
    fn try_acquire(&self) -> bool;

    /// Wait for a permit, giving up at `deadline`
    ///
    /// # Returns
    ///
    /// - `Ok(())`: A permit was taken
    /// - `Err(Error::RateLimitTimeout)`: No permit could be taken before `deadline`
    async fn acquire(&self, deadline: Instant) -> Result<(), crate::Error>;
}
