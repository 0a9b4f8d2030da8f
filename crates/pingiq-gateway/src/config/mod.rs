//! Service config loader (strict parsing).
//!
//! Resolution used by the binary ([`load_from_env`]):
//! 1. `$PINGIQ_CONFIG` if set (the file must exist)
//! 2. `./pingiq.yaml` if present
//! 3. built-in defaults
//!
//! `$PINGIQ_LISTEN` then overrides `server.listen`.

pub mod schema;

use std::fs;
use std::path::Path;

use pingiq_core::error::{PingIqError, Result};

pub use schema::{
    DiagnosticsConfig, EnvConfig, InfoConfig, OpenApiConfig, OpenApiServer, PingIqConfig,
    RateLimitConfig, ReadinessConfig, ServerSection, ShutdownConfig,
};

pub const CONFIG_PATH_ENV: &str = "PINGIQ_CONFIG";
pub const LISTEN_ENV: &str = "PINGIQ_LISTEN";
pub const DEFAULT_CONFIG_PATH: &str = "pingiq.yaml";

pub fn load_from_file(path: impl AsRef<Path>) -> Result<PingIqConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| {
        PingIqError::Internal(format!("read config {} failed: {e}", path.display()))
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<PingIqConfig> {
    let cfg: PingIqConfig = serde_yaml::from_str(s)
        .map_err(|e| PingIqError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load config the way the standalone server does.
pub fn load_from_env() -> Result<PingIqConfig> {
    let mut cfg = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => load_from_file(&path)?,
        Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => load_from_file(DEFAULT_CONFIG_PATH)?,
        Err(_) => {
            tracing::info!(path = DEFAULT_CONFIG_PATH, "config file not found, using defaults");
            PingIqConfig::default()
        }
    };
    if let Ok(listen) = std::env::var(LISTEN_ENV) {
        cfg.server.listen = listen;
    }
    Ok(cfg)
}
