//! Readiness check capability and ready-made checks.

use std::future::Future;
use std::time::Instant;

use async_trait::async_trait;

use pingiq_core::protocol::{HealthStatus, ReadinessCheckResult};

/// Error a check may return; its message lands in the result's `error` field.
pub type CheckError = Box<dyn std::error::Error + Send + Sync>;

/// What a check produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    Structured(ReadinessCheckResult),
    /// The check ran to completion but reported nothing; treated as `ok`.
    Unstructured,
}

impl CheckOutcome {
    /// Normalize to a result. Unstructured outcomes become `{name: "check", status: ok}`.
    pub fn into_result(self) -> ReadinessCheckResult {
        match self {
            CheckOutcome::Structured(r) => r,
            CheckOutcome::Unstructured => ReadinessCheckResult::ok("check"),
        }
    }
}

impl From<ReadinessCheckResult> for CheckOutcome {
    fn from(r: ReadinessCheckResult) -> Self {
        CheckOutcome::Structured(r)
    }
}

impl From<()> for CheckOutcome {
    fn from(_: ()) -> Self {
        CheckOutcome::Unstructured
    }
}

/// A named probe of some dependency. Invoked fresh on every evaluation that
/// misses the cache.
#[async_trait]
pub trait ReadinessCheck: Send + Sync {
    async fn check(&self) -> Result<CheckOutcome, CheckError>;
}

/// Always reports the same result. The default check list is a single
/// `StaticCheck::ok("liveness")`.
#[derive(Debug, Clone)]
pub struct StaticCheck {
    result: ReadinessCheckResult,
}

impl StaticCheck {
    pub fn new(result: ReadinessCheckResult) -> Self {
        Self { result }
    }

    pub fn ok(name: impl Into<String>) -> Self {
        Self::new(ReadinessCheckResult::ok(name))
    }
}

#[async_trait]
impl ReadinessCheck for StaticCheck {
    async fn check(&self) -> Result<CheckOutcome, CheckError> {
        Ok(CheckOutcome::Structured(self.result.clone()))
    }
}

/// Maps an async boolean predicate to `ok` / `fail`.
pub struct BooleanCheck<F> {
    name: String,
    f: F,
}

impl<F, Fut> BooleanCheck<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

#[async_trait]
impl<F, Fut> ReadinessCheck for BooleanCheck<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send,
{
    async fn check(&self) -> Result<CheckOutcome, CheckError> {
        let status = if (self.f)().await {
            HealthStatus::Ok
        } else {
            HealthStatus::Fail
        };
        Ok(ReadinessCheckResult::new(self.name.clone(), status).into())
    }
}

/// Runs a fallible async operation, reporting its duration and, on failure,
/// its error message under this check's name.
pub struct TimedCheck<F> {
    name: String,
    f: F,
}

impl<F, Fut> TimedCheck<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), CheckError>> + Send,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

#[async_trait]
impl<F, Fut> ReadinessCheck for TimedCheck<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), CheckError>> + Send,
{
    async fn check(&self) -> Result<CheckOutcome, CheckError> {
        let start = Instant::now();
        let res = (self.f)().await;
        let ms = start.elapsed().as_millis() as u64;
        let result = match res {
            Ok(()) => ReadinessCheckResult::ok(self.name.clone()),
            Err(e) => ReadinessCheckResult::fail(self.name.clone(), e.to_string()),
        };
        Ok(result.with_duration_ms(ms).into())
    }
}
