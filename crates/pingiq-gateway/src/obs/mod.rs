//! In-process observability.
//!
//! `metrics` holds the counter/gauge registry and its text exposition;
//! `process` samples process-level gauges (uptime, resident memory).

pub mod metrics;
pub mod process;

pub use metrics::{MetricKind, MetricsRegistry};
pub use process::ProcessSampler;
