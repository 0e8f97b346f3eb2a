//! Outbound connection constraints
//!
//! A [`NetworkConstraint`] tells the transport which address family to dial
//! and, optionally, which local address to bind as the connection source.

use crate::address::{Address, IpVersion};
use crate::error::{Error, Result};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Address family used for outbound connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NetworkFamily {
    /// Whatever the resolver and the OS pick
    #[default]
    Any,
    /// IPv4 only
    V4,
    /// IPv6 only
    V6,
}

impl NetworkFamily {
    /// Whether `ip` may be dialed under this family
    pub fn admits(&self, ip: &IpAddr) -> bool {
        match self {
            NetworkFamily::Any => true,
            NetworkFamily::V4 => ip.is_ipv4(),
            NetworkFamily::V6 => ip.is_ipv6(),
        }
    }

    /// The unspecified local address of a forced family
    ///
    /// Binding to it restricts the socket to that family without choosing a
    /// particular interface.
    pub fn unspecified(&self) -> Option<IpAddr> {
        match self {
            NetworkFamily::Any => None,
            NetworkFamily::V4 => Some(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            NetworkFamily::V6 => Some(IpAddr::V6(Ipv6Addr::UNSPECIFIED)),
        }
    }
}

impl From<IpVersion> for NetworkFamily {
    fn from(version: IpVersion) -> Self {
        match version {
            IpVersion::V4 => NetworkFamily::V4,
            IpVersion::V6 => NetworkFamily::V6,
        }
    }
}

impl fmt::Display for NetworkFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkFamily::Any => f.write_str("tcp"),
            NetworkFamily::V4 => f.write_str("tcp4"),
            NetworkFamily::V6 => f.write_str("tcp6"),
        }
    }
}

/// Family and source address for one lookup's connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NetworkConstraint {
    family: NetworkFamily,
    source: Option<Address>,
}

impl NetworkConstraint {
    /// Create a constraint, rejecting a source address outside the forced family
    pub fn new(family: NetworkFamily, source: Option<Address>) -> Result<Self> {
        if let Some(source) = source
            && !family.admits(&source.ip())
        {
            return Err(Error::invalid_input(format!(
                "Source IP '{}' is an {} address, which conflicts with the requested network '{}'",
                source,
                source.version(),
                family
            )));
        }

        Ok(Self { family, source })
    }

    /// No constraint at all
    pub fn any() -> Self {
        Self::default()
    }

    pub fn family(&self) -> NetworkFamily {
        self.family
    }

    pub fn source(&self) -> Option<Address> {
        self.source
    }

    /// The local address the transport should bind, if any
    ///
    /// An explicit source wins; otherwise a forced family binds its
    /// unspecified address.
    pub fn local_address(&self) -> Option<IpAddr> {
        self.source
            .map(|source| source.ip())
            .or_else(|| self.family.unspecified())
    }
}
