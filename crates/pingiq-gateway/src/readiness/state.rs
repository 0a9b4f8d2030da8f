//! Process-local runtime state: maintenance flag plus the single-slot
//! readiness cache.
//!
//! # State Transitions
//! ```text
//! maintenance off → on : cache cleared, generation bumped
//! maintenance on → off : cache cleared, generation bumped
//! evaluation stored    : only if generation unchanged since it started
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use pingiq_core::protocol::ReadinessReport;

#[derive(Debug, Clone)]
struct ReadinessCache {
    computed_at: Instant,
    report: ReadinessReport,
}

#[derive(Debug, Default)]
struct Inner {
    maintenance: bool,
    cache: Option<ReadinessCache>,
    generation: u64,
}

/// What the engine should do for one evaluation.
#[derive(Debug, Clone)]
pub enum Snapshot {
    Maintenance,
    Cached(ReadinessReport),
    /// Nothing usable cached; `generation` must be handed back to `store`.
    Miss { generation: u64 },
}

/// Created once per service instance, shared with the pipeline and the
/// shutdown listener.
#[derive(Debug, Default)]
pub struct RuntimeState {
    inner: Mutex<Inner>,
}

impl RuntimeState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_maintenance(&self) -> bool {
        self.lock().maintenance
    }

    /// Set the maintenance flag. Always clears the readiness cache.
    pub fn set_maintenance(&self, enabled: bool) {
        let mut inner = self.lock();
        inner.maintenance = enabled;
        inner.cache = None;
        inner.generation = inner.generation.wrapping_add(1);
        tracing::info!(enabled, "maintenance mode updated");
    }

    pub fn clear_cache(&self) {
        self.lock().cache = None;
    }

    pub fn has_cache(&self) -> bool {
        self.lock().cache.is_some()
    }

    /// Read maintenance flag and cache under one lock. The cache is only
    /// consulted when `ttl` is non-zero and the entry is younger than `ttl`.
    pub fn snapshot(&self, ttl: Duration, now: Instant) -> Snapshot {
        let inner = self.lock();
        if inner.maintenance {
            return Snapshot::Maintenance;
        }
        if !ttl.is_zero() {
            if let Some(cache) = &inner.cache {
                if now.saturating_duration_since(cache.computed_at) < ttl {
                    return Snapshot::Cached(cache.report.clone());
                }
            }
        }
        Snapshot::Miss {
            generation: inner.generation,
        }
    }

    /// Store a freshly computed report. Returns `false` (and stores nothing)
    /// when maintenance was toggled after the evaluation began.
    pub fn store(&self, report: ReadinessReport, generation: u64, now: Instant) -> bool {
        let mut inner = self.lock();
        if inner.generation != generation || inner.maintenance {
            return false;
        }
        inner.cache = Some(ReadinessCache {
            computed_at: now,
            report,
        });
        true
    }
}
