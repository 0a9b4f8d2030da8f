//! Deterministic helpers shared by the engine and adapters.
//!
//! Nothing here holds state; every function is a pure transformation (apart
//! from reading the wall clock in [`now_utc_iso`]).

use chrono::{SecondsFormat, Utc};

/// Current UTC time as RFC 3339 with millisecond precision (`2024-01-01T00:00:00.000Z`).
pub fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a leading base-10 integer, ignoring trailing garbage (`"128kb"` -> 128).
///
/// Returns `fallback` for missing input or input with no leading digits.
pub fn parse_int_safe(value: Option<&str>, fallback: i64) -> i64 {
    let Some(raw) = value else { return fallback };
    let s = raw.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return fallback;
    }
    match digits[..end].parse::<i64>() {
        Ok(n) => sign * n,
        // Overflowing digit runs saturate rather than fall back.
        Err(_) => if sign < 0 { i64::MIN } else { i64::MAX },
    }
}

/// Parse a whole string as a finite float, else `fallback`.
pub fn to_number_safe(value: Option<&str>, fallback: f64) -> f64 {
    value
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(fallback)
}

/// Bytes transferred over `duration_ms` expressed in megabits per second.
pub fn bytes_to_mbps(bytes: u64, duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return 0.0;
    }
    let bits = bytes as f64 * 8.0;
    bits / (duration_ms / 1000.0) / 1_000_000.0
}

pub fn clamp(n: i64, min: i64, max: i64) -> i64 {
    n.min(max).max(min)
}

/// First address of a comma-separated forwarded-for chain, else `fallback`.
pub fn first_forwarded_ip<'a>(value: Option<&'a str>, fallback: Option<&'a str>) -> Option<&'a str> {
    value
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or(fallback.filter(|s| !s.is_empty()))
}
