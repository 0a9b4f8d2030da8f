//! Shared error type across PingIQ crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, PingIqError>;

/// Unified error type used by core and gateway.
///
/// Every variant is a host-side configuration or programming mistake. Runtime
/// outcomes such as a failing readiness check, an auth rejection or a rate-limit
/// rejection are normal responses and never surface here.
#[derive(Debug, Error)]
pub enum PingIqError {
    #[error("invalid config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("metric {name} already registered with type {existing}")]
    MetricKindConflict { name: String, existing: &'static str },
    #[error("metric {0} not found")]
    UnknownMetric(String),
    #[error("metric {0} is not a gauge")]
    NotAGauge(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl PingIqError {
    /// True for errors that come from metric registry misuse.
    pub fn is_metric_error(&self) -> bool {
        matches!(
            self,
            PingIqError::MetricKindConflict { .. }
                | PingIqError::UnknownMetric(_)
                | PingIqError::NotAGauge(_)
        )
    }
}
