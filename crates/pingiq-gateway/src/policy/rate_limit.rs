//! Per-key token bucket limiter.
//!
//! Buckets are created lazily at full capacity. Capacity and refill rate are
//! shared configuration; only `tokens` and `last_refill` are per key.
//! Refill-and-consume runs under the DashMap shard lock for that key, so the
//! read-modify-write is atomic per bucket.

use std::time::Instant;

use dashmap::DashMap;

use pingiq_core::protocol::RequestContext;
use pingiq_core::util::first_forwarded_ip;

use crate::config::schema::RateLimitConfig;

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_refill: now,
        }
    }

    fn refill(&mut self, capacity: f64, refill_per_sec: f64, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        let add = elapsed * refill_per_sec;
        // Only move the clock when something was credited.
        if add > 0.0 {
            self.tokens = (self.tokens + add).min(capacity);
            self.last_refill = now;
        }
    }

    fn try_take(&mut self, cost: f64) -> bool {
        if self.tokens >= cost {
            self.tokens -= cost;
            true
        } else {
            false
        }
    }
}

/// In-memory token bucket limiter shared by all requests of one service.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: f64,
    refill_per_sec: f64,
    max_buckets: Option<usize>,
    buckets: DashMap<String, TokenBucket>,
}

impl RateLimiter {
    /// `capacity` is floored at 1 and `refill_per_sec` at 0.
    pub fn new(capacity: f64, refill_per_sec: f64) -> Self {
        Self {
            capacity: capacity.max(1.0),
            refill_per_sec: refill_per_sec.max(0.0),
            max_buckets: None,
            buckets: DashMap::new(),
        }
    }

    pub fn from_config(cfg: &RateLimitConfig) -> Self {
        let mut limiter = Self::new(cfg.capacity, cfg.refill_per_second);
        limiter.max_buckets = cfg.max_buckets;
        limiter
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn refill_per_sec(&self) -> f64 {
        self.refill_per_sec
    }

    /// Number of live buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Consume `cost` tokens for `key`. `false` means rejected, bucket untouched
    /// beyond the refill step.
    pub fn try_consume(&self, key: &str, cost: f64) -> bool {
        self.try_consume_at(key, cost, Instant::now())
    }

    /// [`RateLimiter::try_consume`] with an explicit clock reading.
    pub fn try_consume_at(&self, key: &str, cost: f64, now: Instant) -> bool {
        let allowed = {
            let mut bucket = self
                .buckets
                .entry(key.to_string())
                .or_insert_with(|| TokenBucket::new(self.capacity, now));
            bucket.refill(self.capacity, self.refill_per_sec, now);
            bucket.try_take(cost)
        };

        if let Some(max) = self.max_buckets {
            if self.buckets.len() > max {
                self.trim(max, now);
            }
        }
        allowed
    }

    /// Bring the map back under `max`, down to a low-water mark so the sweep
    /// runs once per batch of new keys rather than once per request.
    ///
    /// Full buckets go first: they equal a fresh bucket, so dropping them loses
    /// nothing. If that is not enough, the buckets refilled least recently go next.
    fn trim(&self, max: usize, now: Instant) {
        let before = self.buckets.len();
        let target = max - max / 10;

        self.buckets.retain(|_, b| {
            b.refill(self.capacity, self.refill_per_sec, now);
            b.tokens < self.capacity
        });

        let excess = self.buckets.len().saturating_sub(target);
        if excess > 0 {
            let mut ages: Vec<(String, Instant)> = self
                .buckets
                .iter()
                .map(|e| (e.key().clone(), e.value().last_refill))
                .collect();
            ages.sort_by_key(|(_, at)| *at);
            for (key, _) in ages.into_iter().take(excess) {
                self.buckets.remove(&key);
            }
        }

        tracing::warn!(
            before,
            after = self.buckets.len(),
            stale_evicted = excess,
            "rate limiter bucket map trimmed"
        );
    }
}

/// Rate-limit key for a request: first forwarded-for hop, then the peer
/// address, then the literal `unknown`.
pub fn client_key(ctx: &RequestContext<'_>) -> String {
    first_forwarded_ip(ctx.header("x-forwarded-for"), ctx.ip)
        .unwrap_or("unknown")
        .to_string()
}
