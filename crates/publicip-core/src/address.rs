//! IP literal parsing and family classification
//!
//! Used for the caller's source IP override and for the `ip` field returned
//! by the upstream service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use thiserror::Error;

/// IP version (v4 or v6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    /// IPv4 only
    V4,
    /// IPv6 only
    V6,
}

impl IpVersion {
    /// The textual label, `"v4"` or `"v6"`
    pub fn as_str(&self) -> &'static str {
        match self {
            IpVersion::V4 => "v4",
            IpVersion::V6 => "v6",
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IpVersion {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v4" => Ok(IpVersion::V4),
            "v6" => Ok(IpVersion::V6),
            other => Err(crate::Error::invalid_input(format!(
                "Unrecognized ip_version '{}'. The allowed values are either 'v6' or 'v4'.",
                other
            ))),
        }
    }
}

/// Version label as exposed in a lookup result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionLabel {
    V4,
    V6,
    /// No address was classified at all
    Unknown,
}

impl VersionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionLabel::V4 => "v4",
            VersionLabel::V6 => "v6",
            VersionLabel::Unknown => "unknown",
        }
    }
}

impl From<IpVersion> for VersionLabel {
    fn from(version: IpVersion) -> Self {
        match version {
            IpVersion::V4 => VersionLabel::V4,
            IpVersion::V6 => VersionLabel::V6,
        }
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a literal is neither an IPv4 nor an IPv6 address
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("'{literal}' is not a valid IPv4 or IPv6 address")]
pub struct AddressError {
    /// The rejected input
    pub literal: String,
}

/// A successfully parsed IP address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(IpAddr);

impl Address {
    /// Parse a textual IPv4 or IPv6 literal
    ///
    /// Empty input is rejected here; callers treat an empty string as
    /// "no address constraint" before reaching the parser.
    pub fn parse(literal: &str) -> Result<Self, AddressError> {
        literal
            .parse::<IpAddr>()
            .map(Address)
            .map_err(|_| AddressError {
                literal: literal.to_string(),
            })
    }

    pub fn is_v4(&self) -> bool {
        self.0.is_ipv4()
    }

    pub fn is_v6(&self) -> bool {
        self.0.is_ipv6()
    }

    /// The address family
    pub fn version(&self) -> IpVersion {
        match self.0 {
            IpAddr::V4(_) => IpVersion::V4,
            IpAddr::V6(_) => IpVersion::V6,
        }
    }

    pub fn ip(&self) -> IpAddr {
        self.0
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        Address(ip)
    }
}

/// Canonical string form (compressed, lowercase IPv6)
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Classify an optional address into a version label
///
/// Only the absent address is `Unknown`; every parsed address is v4 or v6.
pub fn classify(address: Option<&Address>) -> VersionLabel {
    match address {
        Some(address) => address.version().into(),
        None => VersionLabel::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ipv4_literal() {
        let address = Address::parse("203.0.113.5").unwrap();
        assert!(address.is_v4());
        assert!(!address.is_v6());
        assert_eq!(address.version(), IpVersion::V4);
        assert_eq!(address.to_string(), "203.0.113.5");
    }

    #[test]
    fn parses_ipv6_literal_into_canonical_form() {
        let address = Address::parse("2001:0DB8:0000:0000:0000:0000:0000:0001").unwrap();
        assert!(address.is_v6());
        assert_eq!(address.to_string(), "2001:db8::1");
    }

    #[test]
    fn ipv4_mapped_ipv6_stays_ipv6() {
        let address = Address::parse("::ffff:192.0.2.1").unwrap();
        assert_eq!(address.version(), IpVersion::V6);
    }

    #[test]
    fn rejects_non_literals() {
        for input in ["", "example.com", "300.1.1.1", "1.2.3", " 1.2.3.4", "fe80::1%eth0"] {
            let err = Address::parse(input).unwrap_err();
            assert_eq!(err.literal, input);
        }
    }

    #[test]
    fn classify_reserves_unknown_for_absent_address() {
        let v4 = Address::parse("192.0.2.1").unwrap();
        let v6 = Address::parse("::").unwrap();
        assert_eq!(classify(Some(&v4)), VersionLabel::V4);
        assert_eq!(classify(Some(&v6)), VersionLabel::V6);
        assert_eq!(classify(None), VersionLabel::Unknown);
    }

    #[test]
    fn ip_version_parsing_is_exact() {
        assert_eq!("v4".parse::<IpVersion>().unwrap(), IpVersion::V4);
        assert_eq!("v6".parse::<IpVersion>().unwrap(), IpVersion::V6);

        let err = "V4".parse::<IpVersion>().unwrap_err();
        assert!(matches!(err, crate::Error::InvalidInput(_)));
        assert!(err.to_string().contains("'V4'"));
        assert!("ipv6".parse::<IpVersion>().is_err());
    }

    #[test]
    fn labels_render_lowercase() {
        assert_eq!(VersionLabel::from(IpVersion::V6).to_string(), "v6");
        assert_eq!(VersionLabel::Unknown.to_string(), "unknown");
        assert_eq!(
            serde_json::to_string(&VersionLabel::Unknown).unwrap(),
            "\"unknown\""
        );
        assert_eq!(serde_json::to_string(&IpVersion::V4).unwrap(), "\"v4\"");
    }
}
