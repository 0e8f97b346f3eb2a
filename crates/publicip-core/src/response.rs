//! Upstream wire format
//!
//! The JSON document served by ifconfig.co-compatible services at `/json`.
//! Only `ip` is required; the geolocation fields are decoded for
//! completeness but not surfaced in a lookup result.

use serde::Deserialize;

/// Body of `GET <provider>/json`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IpResponse {
    /// The caller's public IP, as seen by the service
    pub ip: String,
    #[serde(default)]
    pub ip_decimal: Option<serde_json::Number>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_iso: Option<String>,
    #[serde(default)]
    pub country_eu: Option<bool>,
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub time_zone: Option<String>,
    /// Autonomous system number, e.g. "AS64500"
    #[serde(default)]
    pub asn: Option<String>,
    /// Organisation the ASN is registered to
    #[serde(default)]
    pub asn_org: Option<String>,
    #[serde(default)]
    pub user_agent: Option<UserAgent>,
}

/// The service's parse of our `User-Agent` header
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserAgent {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub raw_value: Option<String>,
}

impl IpResponse {
    /// Decode a response body
    pub fn from_slice(body: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }
}
