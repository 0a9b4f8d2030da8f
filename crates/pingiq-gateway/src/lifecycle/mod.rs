//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Signal received (graceful.rs)
//!     → maintenance on, readiness cache cleared
//!     → load balancers see /readiness fail and stop routing
//!     → drain delay elapses
//!     → process exits (or host is told to stop serving)
//! ```

pub mod graceful;

pub use graceful::{begin_drain, GracefulShutdown, ShutdownOptions, ShutdownSignal};
