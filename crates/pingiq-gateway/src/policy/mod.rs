//! Policy layer (rate limiting).
//!
//! Diagnostics endpoints are the only consumers today; the limiter is keyed by
//! client address so one noisy client cannot starve the others.

pub mod rate_limit;

pub use rate_limit::{client_key, RateLimiter};
