//! Readiness vocabulary.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status of a single check or of the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
    Fail,
}

impl HealthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Ok => "ok",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Fail => "fail",
        }
    }

    /// Vocabulary of the `application/health+json` draft format.
    pub fn as_health_json(self) -> &'static str {
        match self {
            HealthStatus::Ok => "pass",
            HealthStatus::Degraded => "warn",
            HealthStatus::Fail => "fail",
        }
    }

    /// Aggregate rule: any `fail` wins, then any `degraded`, else `ok`.
    pub fn aggregate<'a, I>(statuses: I) -> HealthStatus
    where
        I: IntoIterator<Item = &'a HealthStatus>,
    {
        let mut overall = HealthStatus::Ok;
        for s in statuses {
            match s {
                HealthStatus::Fail => return HealthStatus::Fail,
                HealthStatus::Degraded => overall = HealthStatus::Degraded,
                HealthStatus::Ok => {}
            }
        }
        overall
    }
}

/// Outcome of one readiness check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessCheckResult {
    pub name: String,
    pub status: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

impl ReadinessCheckResult {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
            duration_ms: None,
            error: None,
            details: None,
        }
    }

    pub fn ok(name: impl Into<String>) -> Self {
        Self::new(name, HealthStatus::Ok)
    }

    pub fn degraded(name: impl Into<String>) -> Self {
        Self::new(name, HealthStatus::Degraded)
    }

    pub fn fail(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(name, HealthStatus::Fail)
        }
    }

    pub fn with_duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = Some(details);
        self
    }
}

/// Aggregate of one readiness evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub status: HealthStatus,
    pub checks: Vec<ReadinessCheckResult>,
}

impl ReadinessReport {
    /// Build a report whose status follows [`HealthStatus::aggregate`].
    pub fn from_checks(checks: Vec<ReadinessCheckResult>) -> Self {
        let status = HealthStatus::aggregate(checks.iter().map(|c| &c.status));
        Self { status, checks }
    }

    /// Synthetic report served while maintenance mode is on.
    pub fn maintenance() -> Self {
        Self {
            status: HealthStatus::Fail,
            checks: vec![ReadinessCheckResult::new("maintenance", HealthStatus::Fail)],
        }
    }
}
