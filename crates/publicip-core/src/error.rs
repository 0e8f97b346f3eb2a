//! Error types for the public IP lookup
//!
//! This module defines all error types used throughout the crate.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for lookup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the public IP lookup
///
/// `Config` is fatal to provider setup. Every other variant is fatal to a
/// single lookup only and is never retried.
#[derive(Error, Debug)]
pub enum Error {
    /// Provider configuration errors (bad URL, duration or rate settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid lookup input (unknown version, bad or conflicting source IP)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No rate limiter permit became available before the deadline
    #[error("Rate limit wait exceeded the deadline: {0}")]
    RateLimitTimeout(String),

    /// Network or transport failure while talking to the upstream service
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The upstream service answered with something other than 200 OK
    #[error("Upstream responded with status code {code} '{status}'")]
    UpstreamStatus {
        /// Numeric HTTP status code
        code: u16,
        /// Textual status, e.g. "503 Service Unavailable"
        status: String,
    },

    /// The upstream body was not the expected JSON document
    #[error("Failed to decode upstream response: {0}")]
    Decode(String),

    /// The upstream `ip` field is not a valid IPv4 or IPv6 literal
    #[error("Invalid IP address in upstream response: {0}")]
    ResponseIp(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a rate limit timeout error
    pub fn rate_limit_timeout(msg: impl Into<String>) -> Self {
        Self::RateLimitTimeout(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an upstream status error
    pub fn upstream_status(code: u16, status: impl Into<String>) -> Self {
        Self::UpstreamStatus {
            code,
            status: status.into(),
        }
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a response IP error
    pub fn response_ip(msg: impl Into<String>) -> Self {
        Self::ResponseIp(msg.into())
    }

    /// Whether this error prevents the provider from being set up at all
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
