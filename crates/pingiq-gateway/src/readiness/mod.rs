//! Readiness evaluation and caching.
//!
//! # Data Flow
//! ```text
//! GET /readiness
//!     → state.rs (maintenance? → synthetic fail, cache never consulted)
//!     → state.rs (fresh cached report within ttl? → reuse)
//!     → engine.rs (run every check concurrently, coerce, aggregate)
//!     → state.rs (store report unless maintenance toggled meanwhile)
//! ```
//!
//! # Design Decisions
//! - Maintenance and cache are mutually exclusive: every toggle clears the cache
//! - A failing check is a `fail` entry, never an error for the caller
//! - Concurrent cache misses share one evaluation when a ttl is configured

pub mod check;
pub mod engine;
pub mod state;

pub use check::{BooleanCheck, CheckError, CheckOutcome, ReadinessCheck, StaticCheck, TimedCheck};
pub use engine::ReadinessEngine;
pub use state::RuntimeState;
