//! Endpoint-specific logic, run after the guard admitted the request.

use std::time::Instant;

use bytes::Bytes;
use serde_json::{json, Map, Value};

use pingiq_core::protocol::response::{HEADER_PAYLOAD_BYTES, HEADER_SERVER_DURATION_MS};
use pingiq_core::protocol::{HandlerRequest, HandlerResponse, HealthStatus};
use pingiq_core::util::{clamp, now_utc_iso, parse_int_safe};

use super::{openapi, Endpoint};
use crate::app_state::{PingIq, REQUESTS_TOTAL};
use crate::policy::client_key;

const HEALTH_JSON: &str = "application/health+json";

/// Fixed-body liveness answer. No auth, no gauges; counted only when
/// `liveness_metrics` is on.
pub fn liveness(app: &PingIq, endpoint: Endpoint) -> HandlerResponse {
    if app.cfg().liveness_metrics {
        if let Err(e) = app
            .metrics()
            .inc(REQUESTS_TOTAL, 1.0, &[("endpoint", endpoint.label())])
        {
            tracing::error!(error = %e, "liveness counter update failed");
        }
    }
    match endpoint {
        Endpoint::Root => HandlerResponse::text(200, "OK"),
        _ => HandlerResponse::text(200, "ok"),
    }
}

pub async fn run(app: &PingIq, endpoint: Endpoint, req: &HandlerRequest) -> HandlerResponse {
    match endpoint {
        Endpoint::Root | Endpoint::Health | Endpoint::Healthz => liveness(app, endpoint),
        Endpoint::Ping => ping(),
        Endpoint::Time => HandlerResponse::ok_json(&json!({ "timestamp": now_utc_iso() })),
        Endpoint::Info => info(app),
        Endpoint::Readiness => readiness(app, req).await,
        Endpoint::Metrics => HandlerResponse::metrics(app.metrics().exposition()),
        Endpoint::DiagnosticsNetwork => diagnostics_network(app, req),
        Endpoint::DiagnosticsLatency => diagnostics_latency(app, req),
        Endpoint::Env => env(app),
        Endpoint::OpenApi => openapi_doc(app),
        Endpoint::MaintenanceEnable => maintenance(app, true),
        Endpoint::MaintenanceDisable => maintenance(app, false),
    }
}

fn ping() -> HandlerResponse {
    HandlerResponse::ok_json(&json!({
        "status": "ok",
        "message": "pong",
        "timestamp": now_utc_iso(),
    }))
}

fn info(app: &PingIq) -> HandlerResponse {
    let info = &app.cfg().info;
    let environment = info
        .environment
        .clone()
        .or_else(|| std::env::var("APP_ENV").ok())
        .unwrap_or_else(|| "unknown".to_string());

    let mut body = Map::new();
    body.insert("name".into(), json!(info.name.as_deref().unwrap_or("service")));
    body.insert("version".into(), json!(info.version.as_deref().unwrap_or("0.0.0")));
    body.insert("environment".into(), json!(environment));
    // Extra fields win over the defaults above.
    for (k, v) in &info.extra {
        body.insert(k.clone(), v.clone());
    }
    HandlerResponse::ok_json(&Value::Object(body))
}

async fn readiness(app: &PingIq, req: &HandlerRequest) -> HandlerResponse {
    let runtime = app.runtime();
    let report = app.readiness().evaluate(&runtime).await;
    let code = match report.status {
        HealthStatus::Fail => 503,
        HealthStatus::Ok | HealthStatus::Degraded => 200,
    };

    let wants_health_json = req
        .header("accept")
        .is_some_and(|a| a.to_ascii_lowercase().contains(HEALTH_JSON));
    if wants_health_json {
        return HandlerResponse::json(code, &json!({ "status": report.status.as_health_json() }));
    }

    HandlerResponse::json(
        code,
        &json!({
            "status": report.status,
            "timestamp": now_utc_iso(),
            "checks": report.checks,
        }),
    )
}

/// Take one token for the caller; `false` means answer 429.
fn admit_diagnostics(app: &PingIq, req: &HandlerRequest) -> bool {
    let key = client_key(&req.context());
    let allowed = app.rate_limiter().try_consume(&key, 1.0);
    if !allowed {
        tracing::warn!(client = %key, "diagnostics rate limit exceeded");
    }
    allowed
}

fn server_duration_ms(start: Instant) -> String {
    format!("{:.3}", start.elapsed().as_secs_f64() * 1000.0)
}

fn diagnostics_network(app: &PingIq, req: &HandlerRequest) -> HandlerResponse {
    let start = Instant::now();
    let diag = &app.cfg().diagnostics;
    if !diag.enable_throughput {
        return HandlerResponse::not_found();
    }
    if !admit_diagnostics(app, req) {
        return HandlerResponse::too_many_requests();
    }

    let max = i64::try_from(diag.max_payload_bytes).unwrap_or(i64::MAX);
    let fallback = i64::try_from(diag.default_payload_bytes).unwrap_or(max);
    let requested = parse_int_safe(req.query_param("payload"), fallback);
    let size = usize::try_from(clamp(requested, 0, max)).unwrap_or(0);

    let payload = Bytes::from(vec![0u8; size]);
    HandlerResponse::binary(payload)
        .with_header(HEADER_PAYLOAD_BYTES, size.to_string())
        .with_header(HEADER_SERVER_DURATION_MS, server_duration_ms(start))
}

fn diagnostics_latency(app: &PingIq, req: &HandlerRequest) -> HandlerResponse {
    let start = Instant::now();
    if !admit_diagnostics(app, req) {
        return HandlerResponse::too_many_requests();
    }
    HandlerResponse::binary(Bytes::from_static(&[0u8]))
        .with_header(HEADER_SERVER_DURATION_MS, server_duration_ms(start))
}

fn env(app: &PingIq) -> HandlerResponse {
    let cfg = &app.cfg().env;
    if !cfg.enabled {
        return HandlerResponse::not_found();
    }
    // Unset variables are omitted rather than reported as null.
    let out: Map<String, Value> = cfg
        .allowlist
        .iter()
        .filter_map(|name| std::env::var(name).ok().map(|v| (name.clone(), Value::String(v))))
        .collect();
    HandlerResponse::ok_json(&Value::Object(out))
}

fn openapi_doc(app: &PingIq) -> HandlerResponse {
    if !app.cfg().openapi.enabled {
        return HandlerResponse::not_found();
    }
    HandlerResponse::ok_json(&openapi::generate(app.cfg()))
}

fn maintenance(app: &PingIq, enabled: bool) -> HandlerResponse {
    if enabled {
        app.maintenance().enable();
    } else {
        app.maintenance().disable();
    }
    HandlerResponse::ok_json(&json!({ "maintenance": enabled }))
}
