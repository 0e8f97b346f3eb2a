//! Contract Test: Input Validation Before I/O
//!
//! Constraints verified:
//! - A source IP whose family disagrees with the forced version is rejected
//! - An unparsable source IP is rejected
//! - Rejection happens before the rate limiter or the network is touched
//!
//! If this test fails, invalid requests are consuming rate limiter permits
//! or reaching the upstream service.

mod common;

use common::*;
use publicip_core::{Error, IpVersion, Lookup, LookupRequest};
use std::sync::Arc;

#[tokio::test]
async fn conflicting_families_fail_before_any_network_call() {
    let pairs = [
        ("::", IpVersion::V4),
        ("::1", IpVersion::V4),
        ("2001:db8::10", IpVersion::V4),
        ("0.0.0.0", IpVersion::V6),
        ("192.0.2.10", IpVersion::V6),
    ];

    for (source_ip, version) in pairs {
        let throttle = Arc::new(CountingThrottle::default());
        let lookup = Lookup::new(
            config_with(throttle.clone()),
            StubFetcher::ok_json(r#"{"ip":"203.0.113.5"}"#),
        );

        let request = LookupRequest::new()
            .with_source_ip(source_ip)
            .with_ip_version(version);
        let err = lookup.run(&request).await.unwrap_err();

        assert!(
            matches!(err, Error::InvalidInput(_)),
            "expected InvalidInput for {} / {}, got {:?}",
            source_ip,
            version,
            err
        );
        assert_eq!(lookup.fetcher().call_count(), 0, "no request may be sent");
        assert_eq!(throttle.acquired(), 0, "no permit may be taken");
    }
}

#[tokio::test]
async fn unparsable_source_ip_fails_before_any_network_call() {
    let throttle = Arc::new(CountingThrottle::default());
    let lookup = Lookup::new(
        config_with(throttle.clone()),
        StubFetcher::ok_json(r#"{"ip":"203.0.113.5"}"#),
    );

    let err = lookup
        .run(&LookupRequest::new().with_source_ip("eth0"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(lookup.fetcher().call_count(), 0);
    assert_eq!(throttle.acquired(), 0);
}

#[tokio::test]
async fn matching_families_are_sent() {
    let throttle = Arc::new(CountingThrottle::default());
    let lookup = Lookup::new(
        config_with(throttle.clone()),
        StubFetcher::ok_json(r#"{"ip":"2001:db8::1"}"#),
    );

    let request = LookupRequest::new()
        .with_source_ip("::")
        .with_ip_version(IpVersion::V6);
    lookup.run(&request).await.expect("lookup succeeds");

    assert_eq!(lookup.fetcher().call_count(), 1);
    assert_eq!(throttle.acquired(), 1);
}
