use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use pingiq_core::error::{PingIqError, Result};

use crate::lifecycle::ShutdownSignal;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PingIqConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    /// Prefix every endpoint path is resolved against.
    #[serde(default = "default_base_path")]
    pub base_path: String,

    #[serde(default)]
    pub info: InfoConfig,

    #[serde(default)]
    pub readiness: ReadinessConfig,

    #[serde(default)]
    pub env: EnvConfig,

    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub openapi: OpenApiConfig,

    /// Count liveness hits in `pingiq_requests_total`.
    #[serde(default)]
    pub liveness_metrics: bool,

    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

impl Default for PingIqConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerSection::default(),
            base_path: default_base_path(),
            info: InfoConfig::default(),
            readiness: ReadinessConfig::default(),
            env: EnvConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
            rate_limit: RateLimitConfig::default(),
            openapi: OpenApiConfig::default(),
            liveness_metrics: false,
            shutdown: ShutdownConfig::default(),
        }
    }
}

impl PingIqConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PingIqError::UnsupportedVersion);
        }
        if !self.base_path.starts_with('/') {
            return Err(PingIqError::Config("base_path must start with '/'".into()));
        }
        self.rate_limit.validate()?;
        self.shutdown.validate()?;
        Ok(())
    }

    /// Base path without its trailing slash (`"/"` becomes `""`).
    pub fn base_prefix(&self) -> &str {
        self.base_path.trim_end_matches('/')
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InfoConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    /// Extra fields merged into the `/info` body.
    #[serde(default)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadinessConfig {
    /// Reuse a computed readiness result for this long. 0 disables reuse.
    #[serde(default)]
    pub cache_ttl_ms: u64,
    /// Upper bound per check; unset means checks bound themselves.
    #[serde(default)]
    pub check_timeout_ms: Option<u64>,
}

impl ReadinessConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn check_timeout(&self) -> Option<Duration> {
        self.check_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Only these variable names are ever exposed.
    #[serde(default)]
    pub allowlist: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosticsConfig {
    #[serde(default = "default_enable_throughput")]
    pub enable_throughput: bool,
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: u64,
    #[serde(default = "default_payload_bytes")]
    pub default_payload_bytes: u64,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enable_throughput: default_enable_throughput(),
            max_payload_bytes: default_max_payload_bytes(),
            default_payload_bytes: default_payload_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    #[serde(default = "default_capacity")]
    pub capacity: f64,
    #[serde(default = "default_refill_per_second")]
    pub refill_per_second: f64,
    /// Bound on tracked client keys. Past it the map is trimmed to 90% of the
    /// bound, full buckets first, then least recently refilled. Unset means unbounded.
    #[serde(default)]
    pub max_buckets: Option<usize>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            refill_per_second: default_refill_per_second(),
            max_buckets: None,
        }
    }
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.capacity.is_finite() || !self.refill_per_second.is_finite() {
            return Err(PingIqError::Config(
                "rate_limit.capacity and rate_limit.refill_per_second must be finite".into(),
            ));
        }
        if self.max_buckets == Some(0) {
            return Err(PingIqError::Config("rate_limit.max_buckets must be >= 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenApiConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub servers: Vec<OpenApiServer>,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenApiServer {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShutdownConfig {
    #[serde(default = "default_signals")]
    pub signals: Vec<String>,
    #[serde(default)]
    pub drain_ms: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            signals: default_signals(),
            drain_ms: 0,
        }
    }
}

impl ShutdownConfig {
    pub fn validate(&self) -> Result<()> {
        self.parsed_signals().map(|_| ())
    }

    pub fn parsed_signals(&self) -> Result<Vec<ShutdownSignal>> {
        self.signals.iter().map(|s| s.parse()).collect()
    }

    pub fn drain(&self) -> Duration {
        Duration::from_millis(self.drain_ms)
    }
}

fn default_version() -> u32 {
    1
}
fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_base_path() -> String {
    "/".into()
}
fn default_enable_throughput() -> bool {
    true
}
fn default_max_payload_bytes() -> u64 {
    1_000_000
}
fn default_payload_bytes() -> u64 {
    64 * 1024
}
fn default_capacity() -> f64 {
    5.0
}
fn default_refill_per_second() -> f64 {
    0.2
}
fn default_signals() -> Vec<String> {
    vec!["SIGTERM".into(), "SIGINT".into()]
}
