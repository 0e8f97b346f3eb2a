//! Per-invocation lookup input

use crate::address::{Address, IpVersion};
use crate::error::{Error, Result};
use crate::network::{NetworkConstraint, NetworkFamily};
use serde::{Deserialize, Serialize};

/// Host-supplied lookup request
///
/// Both fields are optional. An empty `source_ip` is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    /// Force IPv4 or IPv6 for the outbound connection
    #[serde(default)]
    pub ip_version: Option<IpVersion>,

    /// Literal local address to bind as the connection source
    #[serde(default)]
    pub source_ip: Option<String>,
}

impl LookupRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the forced IP version
    pub fn with_ip_version(mut self, version: IpVersion) -> Self {
        self.ip_version = Some(version);
        self
    }

    /// Set the source IP literal
    pub fn with_source_ip(mut self, source_ip: impl Into<String>) -> Self {
        self.source_ip = Some(source_ip.into());
        self
    }

    /// The source IP literal, if one was given
    pub fn source_literal(&self) -> Option<&str> {
        self.source_ip.as_deref().filter(|s| !s.is_empty())
    }

    /// Resolve the network constraint for this request
    ///
    /// A forced version fixes the family; otherwise the family of the source
    /// address does, if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when the source IP does not parse or
    /// its family disagrees with the forced version.
    pub fn constraint(&self) -> Result<NetworkConstraint> {
        let source = self
            .source_literal()
            .map(|literal| {
                Address::parse(literal)
                    .map_err(|e| Error::invalid_input(format!("Unable to use the source_ip: {}", e)))
            })
            .transpose()?;

        let family = match (self.ip_version, source) {
            (Some(version), _) => NetworkFamily::from(version),
            (None, Some(source)) => NetworkFamily::from(source.version()),
            (None, None) => NetworkFamily::Any,
        };

        NetworkConstraint::new(family, source)
    }
}
