//! Deterministic helper behavior.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use pingiq_core::util::{bytes_to_mbps, clamp, first_forwarded_ip, now_utc_iso, parse_int_safe, to_number_safe};

#[test]
fn parse_int_takes_leading_digits() {
    assert_eq!(parse_int_safe(Some("128"), 5), 128);
    assert_eq!(parse_int_safe(Some("128kb"), 5), 128);
    assert_eq!(parse_int_safe(Some("  -42"), 5), -42);
    assert_eq!(parse_int_safe(Some("+7"), 5), 7);
}

#[test]
fn parse_int_falls_back() {
    assert_eq!(parse_int_safe(None, 64), 64);
    assert_eq!(parse_int_safe(Some(""), 64), 64);
    assert_eq!(parse_int_safe(Some("abc"), 64), 64);
    assert_eq!(parse_int_safe(Some("-"), 64), 64);
}

#[test]
fn parse_int_saturates_on_overflow() {
    assert_eq!(parse_int_safe(Some("99999999999999999999999"), 0), i64::MAX);
}

#[test]
fn to_number_rejects_non_finite() {
    assert_eq!(to_number_safe(Some("0.25"), 1.0), 0.25);
    assert_eq!(to_number_safe(Some("inf"), 1.0), 1.0);
    assert_eq!(to_number_safe(Some("nope"), 1.0), 1.0);
    assert_eq!(to_number_safe(None, 2.0), 2.0);
}

#[test]
fn mbps_conversion() {
    // 125_000 bytes = 1 megabit, over one second.
    assert!((bytes_to_mbps(125_000, 1000.0) - 1.0).abs() < 1e-9);
    assert_eq!(bytes_to_mbps(1000, 0.0), 0.0);
}

#[test]
fn clamp_bounds() {
    assert_eq!(clamp(999_999_999, 0, 1024), 1024);
    assert_eq!(clamp(-5, 0, 1024), 0);
    assert_eq!(clamp(128, 0, 1024), 128);
}

#[test]
fn forwarded_for_uses_first_hop() {
    assert_eq!(first_forwarded_ip(Some("10.0.0.1, 10.0.0.2"), Some("127.0.0.1")), Some("10.0.0.1"));
    assert_eq!(first_forwarded_ip(Some(" , 10.0.0.2"), Some("127.0.0.1")), Some("127.0.0.1"));
    assert_eq!(first_forwarded_ip(None, Some("127.0.0.1")), Some("127.0.0.1"));
    assert_eq!(first_forwarded_ip(None, None), None);
}

#[test]
fn timestamp_is_utc_millis() {
    let ts = now_utc_iso();
    assert!(ts.ends_with('Z'), "{ts}");
    // 2024-01-01T00:00:00.000Z
    assert_eq!(ts.len(), 24, "{ts}");
}
