//! Normalized lookup output

use crate::address::{self, Address, VersionLabel};
use crate::error::{Error, Result};
use crate::lookup::LookupRequest;
use crate::response::IpResponse;
use serde::{Deserialize, Serialize};

/// Result handed back to the host for persisting as state
///
/// Constructed in one pass from a decoded upstream response and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    /// Derived identifier, only used by the host for re-identification
    pub id: String,

    /// Canonical form of the discovered public address
    pub ip: String,

    /// The forced version if one was requested, otherwise the address family
    pub ip_version: VersionLabel,

    /// Whether the discovered address actually is IPv4
    pub is_ipv4: bool,

    /// Whether the discovered address actually is IPv6
    pub is_ipv6: bool,

    /// ASN as returned by the upstream service, empty if omitted
    pub asn_id: String,

    /// Organisation the ASN is registered to, empty if omitted
    pub asn_org: String,
}

impl LookupResult {
    /// Normalize a decoded upstream response
    ///
    /// The `ip_version` label echoes the requested version when there is one.
    /// `is_ipv4`/`is_ipv6` always reflect the parsed address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResponseIp`] when the upstream `ip` field is not a
    /// valid IPv4 or IPv6 literal.
    pub fn normalize(request: &LookupRequest, response: IpResponse) -> Result<Self> {
        let address = Address::parse(&response.ip).map_err(|e| Error::response_ip(e.to_string()))?;

        let ip_version = match request.ip_version {
            Some(version) => {
                if version != address.version() {
                    tracing::warn!(
                        "Requested {} but the provider reported the {} address {}",
                        version,
                        address.version(),
                        address
                    );
                }
                VersionLabel::from(version)
            }
            None => address::classify(Some(&address)),
        };

        Ok(Self {
            id: derive_id(request, &response.ip),
            ip: address.to_string(),
            ip_version,
            is_ipv4: address.is_v4(),
            is_ipv6: address.is_v6(),
            asn_id: response.asn.unwrap_or_default(),
            asn_org: response.asn_org.unwrap_or_default(),
        })
    }
}

/// `{version}|{upstream ip}|{source ip}`, absent parts left empty
fn derive_id(request: &LookupRequest, upstream_ip: &str) -> String {
    format!(
        "{}|{}|{}",
        request.ip_version.map(|v| v.as_str()).unwrap_or_default(),
        upstream_ip,
        request.source_literal().unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::IpVersion;

    fn response(ip: &str) -> IpResponse {
        IpResponse {
            ip: ip.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn maps_ipv4_response_without_hint() {
        let upstream = IpResponse {
            asn: Some("AS64500".to_string()),
            asn_org: Some("Example".to_string()),
            ..response("203.0.113.5")
        };

        let result = LookupResult::normalize(&LookupRequest::new(), upstream).unwrap();

        assert_eq!(result.ip, "203.0.113.5");
        assert_eq!(result.ip_version, VersionLabel::V4);
        assert!(result.is_ipv4);
        assert!(!result.is_ipv6);
        assert_eq!(result.asn_id, "AS64500");
        assert_eq!(result.asn_org, "Example");
        assert_eq!(result.id, "|203.0.113.5|");
    }

    #[test]
    fn redundant_hint_keeps_label_and_flags() {
        let request = LookupRequest::new().with_ip_version(IpVersion::V6);
        let result = LookupResult::normalize(&request, response("2001:db8::1")).unwrap();

        assert_eq!(result.ip_version, VersionLabel::V6);
        assert!(result.is_ipv6);
        assert!(!result.is_ipv4);
        assert_eq!(result.asn_id, "");
        assert_eq!(result.asn_org, "");
    }

    #[test]
    fn hint_labels_but_flags_follow_the_address() {
        let request = LookupRequest::new().with_ip_version(IpVersion::V4);
        let result = LookupResult::normalize(&request, response("2001:db8::1")).unwrap();

        assert_eq!(result.ip_version, VersionLabel::V4);
        assert!(!result.is_ipv4);
        assert!(result.is_ipv6);
    }

    #[test]
    fn ip_is_canonical_but_id_keeps_raw_upstream_text() {
        let request = LookupRequest::new()
            .with_ip_version(IpVersion::V6)
            .with_source_ip("2001:db8::53");
        let result =
            LookupResult::normalize(&request, response("2001:0db8:0:0:0:0:0:0001")).unwrap();

        assert_eq!(result.ip, "2001:db8::1");
        assert_eq!(result.id, "v6|2001:0db8:0:0:0:0:0:0001|2001:db8::53");
    }

    #[test]
    fn invalid_upstream_ip_is_never_unknown() {
        for ip in ["", "unknown", "203.0.113", "::g"] {
            let err = LookupResult::normalize(&LookupRequest::new(), response(ip)).unwrap_err();
            assert!(matches!(err, Error::ResponseIp(_)), "ip: {:?}", ip);
        }
    }

    #[test]
    fn serializes_with_host_field_names() {
        let result = LookupResult::normalize(&LookupRequest::new(), response("198.51.100.7")).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": "|198.51.100.7|",
                "ip": "198.51.100.7",
                "ip_version": "v4",
                "is_ipv4": true,
                "is_ipv6": false,
                "asn_id": "",
                "asn_org": ""
            })
        );
    }
}
