// # Fetcher Trait
//
// Defines the interface for sending the single upstream GET request.
//
// ## Implementations
//
// - reqwest-based: `publicip-http` crate
// - Test doubles: `tests/common` in this crate
//
// ## Usage
//
// ```rust,ignore
// use publicip_core::{FetchRequest, Fetcher, NetworkConstraint};
//
// let response = fetcher
//     .fetch(&FetchRequest {
//         url: "https://ifconfig.co/json".parse()?,
//         user_agent: "publicip (0.1.0)".to_string(),
//         timeout: std::time::Duration::from_secs(5),
//         constraint: NetworkConstraint::any(),
//     })
//     .await?;
// ```

use crate::network::NetworkConstraint;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Everything a fetcher needs to perform one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Full request URL (`<base>/json`)
    pub url: Url,
    /// Value of the `User-Agent` header
    pub user_agent: String,
    /// Bound on the full request/response cycle
    pub timeout: Duration,
    /// Family and source address for the outbound connection
    pub constraint: NetworkConstraint,
}

/// Raw upstream response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// Numeric HTTP status code
    pub code: u16,
    /// Textual status, e.g. "200 OK"
    pub status: String,
    /// Response body
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_ok(&self) -> bool {
        self.code == 200
    }
}

/// Trait for transport implementations
///
/// A fetcher sends exactly one GET request per call. It must:
/// - Dial using the family and local address of `request.constraint`
/// - Send the given `User-Agent` header
/// - Abort after `request.timeout`, returning [`crate::Error::Timeout`]
/// - Map any other transport failure to [`crate::Error::Transport`]
/// - Return non-200 responses as-is (status checks belong to the lookup)
///
/// It must NOT retry.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform the request and read the whole body
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, crate::Error>;
}
