//! Composition root for one PingIQ service instance.
//!
//! Owns every piece of process-local state (runtime flags, readiness cache,
//! rate-limit buckets, metrics) so several independent instances can live in
//! one process. Clone is cheap: all clones share the same instance.

use std::sync::Arc;

use pingiq_core::error::Result;

use crate::config::PingIqConfig;
use crate::hooks::{AuthCheck, LoggingHooks};
use crate::lifecycle::{GracefulShutdown, ShutdownOptions};
use crate::obs::{MetricsRegistry, ProcessSampler};
use crate::policy::RateLimiter;
use crate::readiness::{ReadinessCheck, ReadinessEngine, RuntimeState, StaticCheck};

pub const REQUESTS_TOTAL: &str = "pingiq_requests_total";
pub const PROCESS_UPTIME_SECONDS: &str = "pingiq_process_uptime_seconds";
pub const PROCESS_RSS_BYTES: &str = "pingiq_process_memory_rss_bytes";

/// Registry pre-populated with the metrics the pipeline writes.
pub fn default_metrics() -> Result<MetricsRegistry> {
    let registry = MetricsRegistry::new();
    registry.counter(
        REQUESTS_TOTAL,
        Some("Total requests to PingIQ endpoints"),
        &["endpoint"],
    )?;
    registry.gauge(PROCESS_UPTIME_SECONDS, Some("Process uptime in seconds"), &[])?;
    registry.gauge(PROCESS_RSS_BYTES, Some("Resident set size memory in bytes"), &[])?;
    Ok(registry)
}

#[derive(Clone)]
pub struct PingIq {
    inner: Arc<PingIqInner>,
}

struct PingIqInner {
    cfg: PingIqConfig,
    metrics: MetricsRegistry,
    limiter: RateLimiter,
    runtime: Arc<RuntimeState>,
    readiness: ReadinessEngine,
    auth: Option<Arc<dyn AuthCheck>>,
    logging: Option<Arc<dyn LoggingHooks>>,
    process: ProcessSampler,
}

/// Collects the non-serializable collaborators before building a [`PingIq`].
pub struct PingIqBuilder {
    cfg: PingIqConfig,
    checks: Vec<Arc<dyn ReadinessCheck>>,
    auth: Option<Arc<dyn AuthCheck>>,
    logging: Option<Arc<dyn LoggingHooks>>,
}

impl PingIqBuilder {
    pub fn check(mut self, check: impl ReadinessCheck + 'static) -> Self {
        self.checks.push(Arc::new(check));
        self
    }

    pub fn check_arc(mut self, check: Arc<dyn ReadinessCheck>) -> Self {
        self.checks.push(check);
        self
    }

    /// Protect every guarded endpoint with `auth`.
    pub fn auth(mut self, auth: impl AuthCheck + 'static) -> Self {
        self.auth = Some(Arc::new(auth));
        self
    }

    pub fn logging(mut self, hooks: impl LoggingHooks + 'static) -> Self {
        self.logging = Some(Arc::new(hooks));
        self
    }

    /// Validate config and assemble the instance. With no checks registered a
    /// single always-ok `liveness` check is used.
    pub fn build(self) -> Result<PingIq> {
        self.cfg.validate()?;

        let mut checks = self.checks;
        if checks.is_empty() {
            checks.push(Arc::new(StaticCheck::ok("liveness")));
        }

        let readiness = ReadinessEngine::new(checks, &self.cfg.readiness);
        let limiter = RateLimiter::from_config(&self.cfg.rate_limit);

        tracing::debug!(
            base_path = %self.cfg.base_path,
            checks = readiness.check_count(),
            cache_ttl_ms = self.cfg.readiness.cache_ttl_ms,
            auth = self.auth.is_some(),
            "pingiq instance built"
        );

        Ok(PingIq {
            inner: Arc::new(PingIqInner {
                metrics: default_metrics()?,
                limiter,
                runtime: Arc::new(RuntimeState::new()),
                readiness,
                auth: self.auth,
                logging: self.logging,
                process: ProcessSampler::new(),
                cfg: self.cfg,
            }),
        })
    }
}

impl PingIq {
    pub fn builder(cfg: PingIqConfig) -> PingIqBuilder {
        PingIqBuilder {
            cfg,
            checks: Vec::new(),
            auth: None,
            logging: None,
        }
    }

    pub fn new(cfg: PingIqConfig) -> Result<Self> {
        Self::builder(cfg).build()
    }

    pub fn cfg(&self) -> &PingIqConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.inner.metrics
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.inner.limiter
    }

    pub fn runtime(&self) -> Arc<RuntimeState> {
        Arc::clone(&self.inner.runtime)
    }

    pub fn readiness(&self) -> &ReadinessEngine {
        &self.inner.readiness
    }

    pub fn auth(&self) -> Option<&Arc<dyn AuthCheck>> {
        self.inner.auth.as_ref()
    }

    pub fn logging(&self) -> Option<&Arc<dyn LoggingHooks>> {
        self.inner.logging.as_ref()
    }

    pub fn maintenance(&self) -> Maintenance<'_> {
        Maintenance(&self.inner.runtime)
    }

    /// Write uptime and resident memory into their gauges.
    pub fn refresh_process_gauges(&self) -> Result<()> {
        let metrics = &self.inner.metrics;
        metrics.set(PROCESS_UPTIME_SECONDS, self.inner.process.uptime_secs(), &[])?;
        if let Some(rss) = self.inner.process.rss_bytes() {
            metrics.set(PROCESS_RSS_BYTES, rss as f64, &[])?;
        }
        Ok(())
    }

    /// Listen for the configured termination signals (see [`GracefulShutdown`]).
    pub fn install_graceful_shutdown(&self, opts: ShutdownOptions) -> Result<GracefulShutdown> {
        GracefulShutdown::install(self.runtime(), opts)
    }
}

/// Operator switch that forces readiness to fail.
pub struct Maintenance<'a>(&'a RuntimeState);

impl Maintenance<'_> {
    pub fn enable(&self) {
        self.0.set_maintenance(true);
    }

    pub fn disable(&self) {
        self.0.set_maintenance(false);
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_maintenance()
    }
}
