//! Request pipeline.
//!
//! - `/`, `/health`, `/healthz` : liveness, no guard
//! - everything else            : guard (hooks, auth, metrics) → endpoint logic
//!
//! `/readiness` answers 503 when the aggregate is `fail` (200 for `ok` and
//! `degraded`) so load balancers can act on the status line alone; the body
//! still carries the full report.
//!
//! Adapters call [`dispatch`] with a [`HandlerRequest`] and translate the
//! returned [`HandlerResponse`]; they hold no state of their own.

pub mod endpoints;
pub mod openapi;

use pingiq_core::error::Result;
use pingiq_core::protocol::{HandlerRequest, HandlerResponse, RequestContext};

use crate::app_state::{PingIq, REQUESTS_TOTAL};

/// Every route the pipeline serves, relative to the configured base path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Root,
    Health,
    Healthz,
    Ping,
    Time,
    Info,
    Readiness,
    Metrics,
    DiagnosticsNetwork,
    DiagnosticsLatency,
    Env,
    OpenApi,
    MaintenanceEnable,
    MaintenanceDisable,
}

impl Endpoint {
    pub const ALL: [Endpoint; 14] = [
        Endpoint::Root,
        Endpoint::Health,
        Endpoint::Healthz,
        Endpoint::Ping,
        Endpoint::Time,
        Endpoint::Info,
        Endpoint::Readiness,
        Endpoint::Metrics,
        Endpoint::DiagnosticsNetwork,
        Endpoint::DiagnosticsLatency,
        Endpoint::Env,
        Endpoint::OpenApi,
        Endpoint::MaintenanceEnable,
        Endpoint::MaintenanceDisable,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            Endpoint::Root => "/",
            Endpoint::Health => "/health",
            Endpoint::Healthz => "/healthz",
            Endpoint::Ping => "/ping",
            Endpoint::Time => "/time",
            Endpoint::Info => "/info",
            Endpoint::Readiness => "/readiness",
            Endpoint::Metrics => "/metrics",
            Endpoint::DiagnosticsNetwork => "/diagnostics/network",
            Endpoint::DiagnosticsLatency => "/diagnostics/latency",
            Endpoint::Env => "/env",
            Endpoint::OpenApi => "/openapi.json",
            Endpoint::MaintenanceEnable => "/maintenance/enable",
            Endpoint::MaintenanceDisable => "/maintenance/disable",
        }
    }

    pub fn method(self) -> &'static str {
        match self {
            Endpoint::MaintenanceEnable | Endpoint::MaintenanceDisable => "POST",
            _ => "GET",
        }
    }

    /// Value of the `endpoint` label in `pingiq_requests_total`.
    pub fn label(self) -> &'static str {
        match self {
            Endpoint::Root => "root",
            Endpoint::Health => "health",
            Endpoint::Healthz => "healthz",
            Endpoint::Ping => "ping",
            Endpoint::Time => "time",
            Endpoint::Info => "info",
            Endpoint::Readiness => "readiness",
            Endpoint::Metrics => "metrics",
            Endpoint::DiagnosticsNetwork => "diagnostics_network",
            Endpoint::DiagnosticsLatency => "diagnostics_latency",
            Endpoint::Env => "env",
            Endpoint::OpenApi => "openapi",
            Endpoint::MaintenanceEnable => "maintenance_enable",
            Endpoint::MaintenanceDisable => "maintenance_disable",
        }
    }

    pub fn is_liveness(self) -> bool {
        matches!(self, Endpoint::Root | Endpoint::Health | Endpoint::Healthz)
    }
}

/// Resolve `method` + `path` against `base_prefix` (base path without its
/// trailing slash).
pub fn route(base_prefix: &str, method: &str, path: &str) -> Option<Endpoint> {
    let rest = path.strip_prefix(base_prefix)?;
    let rest = match rest.trim_end_matches('/') {
        "" => "/",
        trimmed if trimmed.starts_with('/') => trimmed,
        // `/statusping` must not match base `/status`.
        _ => return None,
    };
    Endpoint::ALL
        .into_iter()
        .find(|e| e.suffix() == rest && e.method().eq_ignore_ascii_case(method))
}

/// Route and handle a request; unknown routes get a plain 404.
pub async fn dispatch(app: &PingIq, req: &HandlerRequest) -> HandlerResponse {
    match route(app.cfg().base_prefix(), &req.method, req.path()) {
        Some(endpoint) => handle(app, endpoint, req).await,
        None => HandlerResponse::not_found(),
    }
}

/// Run one endpoint through the guard sequence.
///
/// `on_response` fires exactly once on every path that passed `on_request`.
pub async fn handle(app: &PingIq, endpoint: Endpoint, req: &HandlerRequest) -> HandlerResponse {
    if endpoint.is_liveness() {
        return endpoints::liveness(app, endpoint);
    }

    let ctx = req.context();
    let hooks = app.logging();
    if let Some(h) = hooks {
        h.on_request(&ctx);
    }

    let res = match admit(app, endpoint, &ctx).await {
        Ok(true) => endpoints::run(app, endpoint, req).await,
        Ok(false) => {
            tracing::debug!(endpoint = endpoint.label(), "auth rejected");
            HandlerResponse::unauthorized()
        }
        Err(err) => {
            tracing::error!(endpoint = endpoint.label(), error = %err, "guard failed");
            if let Some(h) = hooks {
                h.on_error(&ctx, &err);
            }
            HandlerResponse::internal_error()
        }
    };

    if let Some(h) = hooks {
        h.on_response(&ctx, res.status());
    }
    res
}

/// Auth, then request counter and process gauges.
async fn admit(app: &PingIq, endpoint: Endpoint, ctx: &RequestContext<'_>) -> Result<bool> {
    if let Some(auth) = app.auth() {
        if !auth.authorize(ctx).await {
            return Ok(false);
        }
    }
    app.metrics()
        .inc(REQUESTS_TOTAL, 1.0, &[("endpoint", endpoint.label())])?;
    app.refresh_process_gauges()?;
    Ok(true)
}
