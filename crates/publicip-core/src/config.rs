//! Provider configuration
//!
//! [`ProviderSettings`] is what the host hands over: every field optional,
//! durations still text. [`ProviderConfig`] is the resolved, validated form
//! that lookups borrow. It is built once and never mutated.

use crate::error::{Error, Result};
use crate::ratelimit::RateLimiter;
use crate::traits::Throttle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Default IP information provider
pub const DEFAULT_PROVIDER_URL: &str = "https://ifconfig.co/";

/// Default timeout of the request to the IP information provider
pub const DEFAULT_TIMEOUT: &str = "5s";

/// Default time until the rate limiter grants another request
pub const DEFAULT_RATE_LIMIT_RATE: &str = "500ms";

/// Default number of requests per rate period
pub const DEFAULT_RATE_LIMIT_BURST: i64 = 1;

/// Longest accepted duration, about 292 years
pub const MAX_DURATION: Duration = Duration::from_nanos(i64::MAX as u64);

/// Host-supplied provider settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// URL to an ifconfig.co-compatible IP information provider
    #[serde(default)]
    pub provider_url: Option<String>,

    /// Timeout of the request, e.g. "5s"
    #[serde(default)]
    pub timeout: Option<String>,

    /// Time until the rate limit is reset, e.g. "500ms"
    #[serde(default)]
    pub rate_limit_rate: Option<String>,

    /// Number of requests per rate period
    #[serde(default)]
    pub rate_limit_burst: Option<i64>,
}

/// Resolved provider configuration
///
/// All fields are validated at construction; a `ProviderConfig` that exists
/// is usable.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the lookup service
    base_url: Url,

    /// `<base_url>/json`
    lookup_url: Url,

    /// Bound on one lookup (rate limiter wait, and request/response cycle)
    timeout: Duration,

    /// Shared request gate
    rate_limiter: Arc<dyn Throttle>,

    /// Sent with every request
    user_agent: String,
}

impl ProviderConfig {
    /// Resolve host-supplied settings
    ///
    /// # Parameters
    ///
    /// - `settings`: Raw settings, absent fields fall back to the defaults
    /// - `tool_name`: Name used in the `User-Agent` header
    /// - `version`: Version used in the `User-Agent` header
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for the first field that fails to resolve.
    pub fn from_settings(settings: &ProviderSettings, tool_name: &str, version: &str) -> Result<Self> {
        let provider_url = settings
            .provider_url
            .as_deref()
            .unwrap_or(DEFAULT_PROVIDER_URL);
        let base_url = parse_provider_url(provider_url)?;
        let lookup_url = json_endpoint(&base_url)?;

        let timeout = parse_duration(
            "timeout",
            settings.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT),
        )?;

        let rate = parse_duration(
            "rate_limit_rate",
            settings
                .rate_limit_rate
                .as_deref()
                .unwrap_or(DEFAULT_RATE_LIMIT_RATE),
        )?;
        let burst = parse_burst(settings.rate_limit_burst.unwrap_or(DEFAULT_RATE_LIMIT_BURST))?;
        let rate_limiter = RateLimiter::new(rate, burst)?;

        tracing::debug!(
            "Provider configured (url={}, timeout={:?}, rate={:?}, burst={})",
            base_url,
            timeout,
            rate,
            burst
        );

        Ok(Self {
            base_url,
            lookup_url,
            timeout,
            rate_limiter: Arc::new(rate_limiter),
            user_agent: format!("{} ({})", tool_name, version),
        })
    }

    /// Replace the rate limiter
    pub fn with_throttle(mut self, throttle: Arc<dyn Throttle>) -> Self {
        self.rate_limiter = throttle;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The endpoint every lookup requests
    pub fn lookup_url(&self) -> &Url {
        &self.lookup_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn rate_limiter(&self) -> &Arc<dyn Throttle> {
        &self.rate_limiter
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

fn parse_provider_url(value: &str) -> Result<Url> {
    let url = Url::parse(value).map_err(|e| {
        Error::config(format!(
            "The provider_url value '{}' can't be parsed: {}",
            value, e
        ))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::config(format!(
            "The provider_url value '{}' must use the http or https scheme, got '{}'",
            value, scheme
        ))),
    }
}

/// Append `json` to the URL path, keeping query and existing path segments
fn json_endpoint(base: &Url) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::config(format!("The provider_url value '{}' can't carry a path", base)))?
        .pop_if_empty()
        .push("json");
    Ok(url)
}

fn parse_duration(field: &str, value: &str) -> Result<Duration> {
    let duration = humantime::parse_duration(value).map_err(|e| {
        Error::config(format!(
            "The {} value '{}' can't be parsed: {}",
            field, value, e
        ))
    })?;

    if duration.is_zero() {
        return Err(Error::config(format!(
            "The {} value '{}' must be bigger than zero",
            field, value
        )));
    }

    if duration > MAX_DURATION {
        return Err(Error::config(format!(
            "The {} value '{}' is too big. Maximum allowed is {}",
            field,
            value,
            humantime::format_duration(MAX_DURATION)
        )));
    }

    Ok(duration)
}

fn parse_burst(value: i64) -> Result<u32> {
    if value <= 0 {
        return Err(Error::config(format!(
            "The rate_limit_burst value '{}' must be bigger than 0",
            value
        )));
    }

    u32::try_from(value).map_err(|_| {
        Error::config(format!(
            "The rate_limit_burst value '{}' is too big. Maximum allowed is {}",
            value,
            u32::MAX
        ))
    })
}
