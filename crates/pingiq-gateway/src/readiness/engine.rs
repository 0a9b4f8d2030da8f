//! Runs readiness checks and applies the maintenance/cache rules.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use futures_util::FutureExt;
use tokio::sync::Mutex;

use pingiq_core::protocol::{ReadinessCheckResult, ReadinessReport};

use super::check::{CheckError, CheckOutcome, ReadinessCheck};
use super::state::{RuntimeState, Snapshot};
use crate::config::ReadinessConfig;

/// Readiness engine for one service instance.
pub struct ReadinessEngine {
    checks: Vec<Arc<dyn ReadinessCheck>>,
    ttl: Duration,
    check_timeout: Option<Duration>,
    // Serializes cache refreshes so concurrent misses share one evaluation.
    refresh: Mutex<()>,
}

impl ReadinessEngine {
    pub fn new(checks: Vec<Arc<dyn ReadinessCheck>>, cfg: &ReadinessConfig) -> Self {
        Self {
            checks,
            ttl: cfg.cache_ttl(),
            check_timeout: cfg.check_timeout(),
            refresh: Mutex::new(()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Evaluate readiness against `state`.
    ///
    /// Maintenance short-circuits to a synthetic `fail`. Otherwise a cached
    /// report younger than the ttl is reused; on a miss every check runs and
    /// the fresh aggregate is stored.
    pub async fn evaluate(&self, state: &RuntimeState) -> ReadinessReport {
        let generation = match state.snapshot(self.ttl, Instant::now()) {
            Snapshot::Maintenance => return ReadinessReport::maintenance(),
            Snapshot::Cached(report) => return report,
            Snapshot::Miss { generation } => generation,
        };

        if self.ttl.is_zero() {
            return self.compute_and_store(state, generation).await;
        }

        let _guard = self.refresh.lock().await;
        // Another task may have refreshed while we waited.
        match state.snapshot(self.ttl, Instant::now()) {
            Snapshot::Maintenance => ReadinessReport::maintenance(),
            Snapshot::Cached(report) => report,
            Snapshot::Miss { generation } => self.compute_and_store(state, generation).await,
        }
    }

    async fn compute_and_store(&self, state: &RuntimeState, generation: u64) -> ReadinessReport {
        let report = run_checks(&self.checks, self.check_timeout).await;
        if !state.store(report.clone(), generation, Instant::now()) {
            tracing::debug!("maintenance toggled during evaluation; result not cached");
        }
        report
    }
}

/// Run every check concurrently and aggregate. Results keep registration order.
pub async fn run_checks(
    checks: &[Arc<dyn ReadinessCheck>],
    timeout: Option<Duration>,
) -> ReadinessReport {
    let results = join_all(checks.iter().map(|c| run_one(c.as_ref(), timeout))).await;
    ReadinessReport::from_checks(results)
}

async fn run_one(check: &dyn ReadinessCheck, timeout: Option<Duration>) -> ReadinessCheckResult {
    let start = Instant::now();
    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, guarded(check)).await {
            Ok(res) => res,
            Err(_) => Err(format!("check timed out after {}ms", limit.as_millis()).into()),
        },
        None => guarded(check).await,
    };
    let duration_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(outcome) => CheckOutcome::into_result(outcome).with_duration_ms(duration_ms),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            ReadinessCheckResult::fail("check", e.to_string()).with_duration_ms(duration_ms)
        }
    }
}

/// A panicking check is reported as an error instead of unwinding into the
/// request pipeline.
async fn guarded(check: &dyn ReadinessCheck) -> Result<CheckOutcome, CheckError> {
    match AssertUnwindSafe(check.check()).catch_unwind().await {
        Ok(res) => res,
        Err(_) => Err("check panicked".into()),
    }
}
