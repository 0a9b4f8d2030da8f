#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::time::{Duration, Instant};

use pingiq_core::protocol::{FieldValue, RequestContext};
use pingiq_gateway::config::RateLimitConfig;
use pingiq_gateway::policy::{client_key, RateLimiter};

#[test]
fn burst_up_to_capacity_then_reject() {
    let rl = RateLimiter::new(5.0, 0.0);
    let now = Instant::now();
    for _ in 0..5 {
        assert!(rl.try_consume_at("1.2.3.4", 1.0, now));
    }
    assert!(!rl.try_consume_at("1.2.3.4", 1.0, now));
    // Other keys have their own bucket.
    assert!(rl.try_consume_at("5.6.7.8", 1.0, now));
}

#[test]
fn refill_over_time() {
    let rl = RateLimiter::new(2.0, 1.0);
    let t0 = Instant::now();
    assert!(rl.try_consume_at("k", 1.0, t0));
    assert!(rl.try_consume_at("k", 1.0, t0));
    assert!(!rl.try_consume_at("k", 1.0, t0));

    let t1 = t0 + Duration::from_millis(1500);
    assert!(rl.try_consume_at("k", 1.0, t1));
    assert!(!rl.try_consume_at("k", 1.0, t1));

    // Refill never exceeds capacity.
    let t2 = t1 + Duration::from_secs(60);
    assert!(rl.try_consume_at("k", 1.0, t2));
    assert!(rl.try_consume_at("k", 1.0, t2));
    assert!(!rl.try_consume_at("k", 1.0, t2));
}

#[test]
fn parameters_are_floored() {
    let rl = RateLimiter::new(0.0, -3.0);
    assert_eq!(rl.capacity(), 1.0);
    assert_eq!(rl.refill_per_sec(), 0.0);
    let now = Instant::now();
    assert!(rl.try_consume_at("k", 1.0, now));
    assert!(!rl.try_consume_at("k", 1.0, now + Duration::from_secs(3600)));
}

#[test]
fn rejection_does_not_consume() {
    let rl = RateLimiter::new(3.0, 0.0);
    let now = Instant::now();
    assert!(!rl.try_consume_at("k", 5.0, now));
    assert!(rl.try_consume_at("k", 3.0, now));
}

#[test]
fn full_buckets_are_evicted_past_max() {
    let cfg = RateLimitConfig {
        capacity: 1.0,
        refill_per_second: 1.0,
        max_buckets: Some(2),
    };
    let rl = RateLimiter::from_config(&cfg);
    let t0 = Instant::now();
    assert!(rl.try_consume_at("a", 1.0, t0));
    assert!(rl.try_consume_at("b", 1.0, t0));
    assert_eq!(rl.len(), 2);

    // By t1 "a" and "b" have refilled; the new key pushes the map over the bound.
    let t1 = t0 + Duration::from_secs(5);
    assert!(rl.try_consume_at("c", 1.0, t1));
    assert_eq!(rl.len(), 1);
    assert!(!rl.try_consume_at("c", 1.0, t1));
}

#[test]
fn stale_buckets_are_evicted_when_none_are_full() {
    let cfg = RateLimitConfig {
        capacity: 1.0,
        refill_per_second: 0.0,
        max_buckets: Some(10),
    };
    let rl = RateLimiter::from_config(&cfg);
    let t0 = Instant::now();
    for i in 0..10u64 {
        assert!(rl.try_consume_at(&format!("spoofed-{i}"), 1.0, t0 + Duration::from_millis(i)));
    }
    assert_eq!(rl.len(), 10);

    // The 11th key overflows the bound; nothing has refilled, so the oldest go.
    assert!(rl.try_consume_at("spoofed-10", 1.0, t0 + Duration::from_millis(10)));
    assert_eq!(rl.len(), 9);

    // Newest keys keep their drained state.
    assert!(!rl.try_consume_at("spoofed-10", 1.0, t0 + Duration::from_millis(11)));
    assert!(!rl.try_consume_at("spoofed-9", 1.0, t0 + Duration::from_millis(11)));
    // An evicted key starts over with a fresh bucket.
    assert!(rl.try_consume_at("spoofed-0", 1.0, t0 + Duration::from_millis(12)));
    assert_eq!(rl.len(), 10);
}

#[test]
fn client_key_prefers_forwarded_for() {
    let mut headers = HashMap::new();
    headers.insert("x-forwarded-for".to_string(), FieldValue::from("9.9.9.9, 10.0.0.1"));
    let ctx = RequestContext {
        method: "GET",
        url: "/diagnostics/latency",
        headers: &headers,
        ip: Some("127.0.0.1"),
    };
    assert_eq!(client_key(&ctx), "9.9.9.9");

    let empty = HashMap::new();
    let ctx = RequestContext { headers: &empty, ..ctx };
    assert_eq!(client_key(&ctx), "127.0.0.1");

    let ctx = RequestContext { ip: None, ..ctx };
    assert_eq!(client_key(&ctx), "unknown");
}
