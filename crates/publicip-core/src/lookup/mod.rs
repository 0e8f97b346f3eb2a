//! The lookup operation
//!
//! A [`Lookup`] turns one [`LookupRequest`] into one [`LookupResult`] using a
//! shared [`ProviderConfig`] and an injected [`Fetcher`].
//!
//! ## Flow
//!
//! ```text
//! validate ─▶ throttle ─▶ build ─▶ send ─▶ check status ─▶ decode ─▶ normalize
//! ```
//!
//! The flow is linear. Every failure ends the lookup with a distinct error
//! and nothing is retried; a point-in-time IP lookup is best effort.

mod request;
mod result;

pub use request::LookupRequest;
pub use result::LookupResult;

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::response::IpResponse;
use crate::traits::{FetchRequest, Fetcher};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Single-shot public IP lookup
///
/// Cheap to share: the configuration is behind an `Arc` and the fetcher is
/// borrowed for each run, so many lookups can run concurrently against the
/// same rate limiter.
pub struct Lookup<F> {
    /// Resolved provider configuration
    config: Arc<ProviderConfig>,

    /// Transport for the upstream request
    fetcher: F,
}

impl<F: Fetcher> Lookup<F> {
    /// Create a new lookup
    pub fn new(config: Arc<ProviderConfig>, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Run the lookup
    ///
    /// # Returns
    ///
    /// - `Ok(LookupResult)`: The normalized result
    /// - `Err(Error::InvalidInput)`: Bad or conflicting request, nothing was sent
    /// - `Err(Error::RateLimitTimeout)`: No permit within the timeout, nothing was sent
    /// - `Err(Error::Transport | Error::Timeout)`: The request failed
    /// - `Err(Error::UpstreamStatus)`: The provider did not answer 200 OK
    /// - `Err(Error::Decode)`: The body is not the expected JSON
    /// - `Err(Error::ResponseIp)`: The reported IP is not a valid literal
    pub async fn run(&self, request: &LookupRequest) -> Result<LookupResult> {
        let constraint = request.constraint().inspect_err(|e| {
            warn!("Rejected lookup request: {}", e);
        })?;
        debug!(
            "Lookup validated (network={}, source={:?})",
            constraint.family(),
            constraint.source()
        );

        let deadline = Instant::now()
            .checked_add(self.config.timeout())
            .ok_or_else(|| {
                Error::config(format!(
                    "The timeout {:?} does not fit a deadline",
                    self.config.timeout()
                ))
            })
            .inspect_err(|e| warn!("Rejected lookup: {}", e))?;
        self.config
            .rate_limiter()
            .acquire(deadline)
            .await
            .inspect_err(|e| warn!("Rate limiter error: {}", e))?;

        let fetch_request = FetchRequest {
            url: self.config.lookup_url().clone(),
            user_agent: self.config.user_agent().to_string(),
            timeout: self.config.timeout(),
            constraint,
        };
        debug!(
            "Sending request to {} ({})",
            fetch_request.url, fetch_request.user_agent
        );

        let response = self.fetcher.fetch(&fetch_request).await.inspect_err(|e| {
            warn!("Request to {} failed: {}", fetch_request.url, e);
        })?;

        if !response.is_ok() {
            warn!(
                "The IP information provider responded with {} '{}'",
                response.code, response.status
            );
            return Err(Error::upstream_status(response.code, response.status));
        }

        let body = IpResponse::from_slice(&response.body).inspect_err(|e| {
            warn!("Unable to decode the provider response: {}", e);
        })?;
        debug!("Decoded provider response: {:?}", body);

        let result = LookupResult::normalize(request, body).inspect_err(|e| {
            warn!("Unable to use the reported IP: {}", e);
        })?;
        info!(
            "Public IP is {} ({}, asn={:?})",
            result.ip, result.ip_version, result.asn_id
        );

        Ok(result)
    }
}
