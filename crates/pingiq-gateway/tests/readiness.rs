#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use pingiq_core::protocol::{HealthStatus, ReadinessCheckResult};
use pingiq_gateway::config::ReadinessConfig;
use pingiq_gateway::readiness::{
    BooleanCheck, CheckError, CheckOutcome, ReadinessCheck, ReadinessEngine, RuntimeState,
    StaticCheck, TimedCheck,
};

/// Counts invocations and reports `ok`.
struct Counting {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ReadinessCheck for Counting {
    async fn check(&self) -> Result<CheckOutcome, CheckError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ReadinessCheckResult::ok("db").into())
    }
}

struct Failing;

#[async_trait]
impl ReadinessCheck for Failing {
    async fn check(&self) -> Result<CheckOutcome, CheckError> {
        Err("boom".into())
    }
}

struct Silent;

#[async_trait]
impl ReadinessCheck for Silent {
    async fn check(&self) -> Result<CheckOutcome, CheckError> {
        Ok(().into())
    }
}

struct Exploding;

#[async_trait]
impl ReadinessCheck for Exploding {
    async fn check(&self) -> Result<CheckOutcome, CheckError> {
        panic!("dependency client poisoned");
    }
}

struct Slow;

#[async_trait]
impl ReadinessCheck for Slow {
    async fn check(&self) -> Result<CheckOutcome, CheckError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(ReadinessCheckResult::ok("slow").into())
    }
}

fn engine(checks: Vec<Arc<dyn ReadinessCheck>>, cache_ttl_ms: u64) -> ReadinessEngine {
    ReadinessEngine::new(
        checks,
        &ReadinessConfig {
            cache_ttl_ms,
            check_timeout_ms: None,
        },
    )
}

fn counting() -> (Arc<dyn ReadinessCheck>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    (Arc::new(Counting { calls: Arc::clone(&calls) }), calls)
}

#[tokio::test]
async fn no_ttl_runs_checks_every_time() {
    let (check, calls) = counting();
    let engine = engine(vec![check], 0);
    let state = RuntimeState::new();

    engine.evaluate(&state).await;
    engine.evaluate(&state).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn cached_result_reused_within_ttl() {
    let (check, calls) = counting();
    let engine = engine(vec![check], 60_000);
    let state = RuntimeState::new();

    let first = engine.evaluate(&state).await;
    let second = engine.evaluate(&state).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first, second);
    assert!(state.has_cache());
}

#[tokio::test]
async fn concurrent_misses_share_one_evaluation() {
    let (check, calls) = counting();
    let engine = Arc::new(engine(vec![check], 60_000));
    let state = Arc::new(RuntimeState::new());

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let state = Arc::clone(&state);
            tokio::spawn(async move { engine.evaluate(&state).await })
        })
        .collect();
    for t in tasks {
        assert_eq!(t.await.unwrap().status, HealthStatus::Ok);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn maintenance_short_circuits_and_clears_cache() {
    let (check, calls) = counting();
    let engine = engine(vec![check], 60_000);
    let state = RuntimeState::new();

    engine.evaluate(&state).await;
    assert!(state.has_cache());

    state.set_maintenance(true);
    assert!(!state.has_cache());
    let report = engine.evaluate(&state).await;
    assert_eq!(report.status, HealthStatus::Fail);
    assert_eq!(report.checks.len(), 1);
    assert_eq!(report.checks[0].name, "maintenance");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Leaving maintenance forces a fresh evaluation.
    state.set_maintenance(false);
    let report = engine.evaluate(&state).await;
    assert_eq!(report.status, HealthStatus::Ok);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn store_rejected_after_maintenance_toggle() {
    use pingiq_core::protocol::ReadinessReport;
    use pingiq_gateway::readiness::state::Snapshot;
    use std::time::Instant;

    let state = RuntimeState::new();
    let ttl = Duration::from_secs(60);
    let generation = match state.snapshot(ttl, Instant::now()) {
        Snapshot::Miss { generation } => generation,
        other => panic!("unexpected snapshot: {other:?}"),
    };

    state.set_maintenance(true);
    state.set_maintenance(false);

    let report = ReadinessReport::from_checks(vec![ReadinessCheckResult::ok("db")]);
    assert!(!state.store(report, generation, Instant::now()));
    assert!(!state.has_cache());
}

#[tokio::test]
async fn check_error_becomes_fail_named_check() {
    let engine = engine(vec![Arc::new(StaticCheck::ok("db")), Arc::new(Failing)], 0);
    let report = engine.evaluate(&RuntimeState::new()).await;

    assert_eq!(report.status, HealthStatus::Fail);
    assert_eq!(report.checks[0].name, "db");
    assert_eq!(report.checks[1].name, "check");
    assert_eq!(report.checks[1].status, HealthStatus::Fail);
    assert_eq!(report.checks[1].error.as_deref(), Some("boom"));
}

#[tokio::test]
async fn panicking_check_becomes_fail() {
    let engine = engine(vec![Arc::new(StaticCheck::ok("db")), Arc::new(Exploding)], 0);
    let report = engine.evaluate(&RuntimeState::new()).await;

    assert_eq!(report.status, HealthStatus::Fail);
    assert_eq!(report.checks[0].status, HealthStatus::Ok);
    assert_eq!(report.checks[1].name, "check");
    assert_eq!(report.checks[1].error.as_deref(), Some("check panicked"));
}

#[tokio::test]
async fn unstructured_outcome_is_ok() {
    let engine = engine(vec![Arc::new(Silent)], 0);
    let report = engine.evaluate(&RuntimeState::new()).await;
    assert_eq!(report.status, HealthStatus::Ok);
    assert_eq!(report.checks[0].name, "check");
}

#[tokio::test]
async fn degraded_without_fail_aggregates_to_degraded() {
    let engine = engine(
        vec![
            Arc::new(StaticCheck::ok("db")),
            Arc::new(StaticCheck::new(ReadinessCheckResult::degraded("cache"))),
        ],
        0,
    );
    let report = engine.evaluate(&RuntimeState::new()).await;
    assert_eq!(report.status, HealthStatus::Degraded);
}

#[tokio::test]
async fn empty_check_list_is_ok() {
    let engine = engine(Vec::new(), 0);
    let report = engine.evaluate(&RuntimeState::new()).await;
    assert_eq!(report.status, HealthStatus::Ok);
    assert!(report.checks.is_empty());
}

#[tokio::test]
async fn ready_made_checks() {
    let up = BooleanCheck::new("queue", || async { true });
    let down = BooleanCheck::new("queue", || async { false });
    let timed = TimedCheck::new("db", || async { Err::<(), CheckError>("refused".into()) });

    let up = up.check().await.unwrap().into_result();
    let down = down.check().await.unwrap().into_result();
    let timed = timed.check().await.unwrap().into_result();

    assert_eq!(up.status, HealthStatus::Ok);
    assert_eq!(down.status, HealthStatus::Fail);
    assert_eq!(timed.name, "db");
    assert_eq!(timed.error.as_deref(), Some("refused"));
    assert!(timed.duration_ms.is_some());
}

#[tokio::test(start_paused = true)]
async fn slow_check_times_out() {
    let engine = ReadinessEngine::new(
        vec![Arc::new(Slow)],
        &ReadinessConfig {
            cache_ttl_ms: 0,
            check_timeout_ms: Some(100),
        },
    );
    let report = engine.evaluate(&RuntimeState::new()).await;
    assert_eq!(report.status, HealthStatus::Fail);
    assert_eq!(
        report.checks[0].error.as_deref(),
        Some("check timed out after 100ms")
    );
}
