//! Network-constrained HTTP client construction
//!
//! A client is built for one [`NetworkConstraint`]:
//!
//! - The local address is bound to the source IP, or to the unspecified
//!   address of a forced family, so sockets can only be of that family
//! - Host names are resolved through [`FamilyResolver`], which drops
//!   addresses of the other family before any dial is attempted
//!
//! Dial timeout and TCP keep-alive are fixed; the per-request timeout is set
//! on each request instead.

use publicip_core::{Error, NetworkConstraint, NetworkFamily, Result};
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use url::{Host, Url};

/// Connection establishment timeout
const DIAL_TIMEOUT: Duration = Duration::from_secs(30);

/// TCP keep-alive interval
const KEEP_ALIVE: Duration = Duration::from_secs(30);

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// DNS resolution strategy that only yields addresses of one family
#[derive(Debug, Clone, Copy)]
pub(crate) struct FamilyResolver {
    family: NetworkFamily,
}

impl FamilyResolver {
    pub(crate) fn new(family: NetworkFamily) -> Self {
        Self { family }
    }
}

impl Resolve for FamilyResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(resolve_family(name.as_str().to_string(), self.family))
    }
}

async fn resolve_family(host: String, family: NetworkFamily) -> std::result::Result<Addrs, BoxError> {
    // Port is ignored by the connector, it uses the one from the URL
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host.as_str(), 0))
        .await?
        .filter(|addr| family.admits(&addr.ip()))
        .collect();

    if addrs.is_empty() {
        return Err(format!("No {} address found for '{}'", family, host).into());
    }

    tracing::debug!("Resolved {} for {}: {:?}", host, family, addrs);
    Ok(Box::new(addrs.into_iter()))
}

/// Reject an IP literal host the constraint does not admit
///
/// Literal hosts never reach the resolver, and the connector only binds a
/// local address of the destination's family, so this is checked up front.
pub(crate) fn check_literal_host(url: &Url, constraint: &NetworkConstraint) -> Result<()> {
    let ip = match url.host() {
        Some(Host::Ipv4(ip)) => IpAddr::V4(ip),
        Some(Host::Ipv6(ip)) => IpAddr::V6(ip),
        _ => return Ok(()),
    };

    if constraint.family().admits(&ip) {
        return Ok(());
    }

    Err(Error::transport(format!(
        "There was an error when contacting '{}': {} is not reachable over {}",
        url,
        ip,
        constraint.family()
    )))
}

/// Build a client whose connections honour `constraint`
pub(crate) fn build(constraint: &NetworkConstraint) -> Result<reqwest::Client> {
    tracing::debug!(
        "Building HTTP client (network={}, local_addr={:?})",
        constraint.family(),
        constraint.local_address()
    );

    let mut builder = reqwest::Client::builder()
        .connect_timeout(DIAL_TIMEOUT)
        .tcp_keepalive(KEEP_ALIVE)
        .local_address(constraint.local_address());

    if constraint.family() != NetworkFamily::Any {
        builder = builder.dns_resolver(Arc::new(FamilyResolver::new(constraint.family())));
    }

    builder
        .build()
        .map_err(|e| Error::transport(format!("Unable to build the HTTP client: {}", e)))
}
