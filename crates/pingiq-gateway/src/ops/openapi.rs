//! OpenAPI 3.0.3 document describing the mounted endpoints.

use serde_json::{json, Map, Value};

use super::Endpoint;
use crate::config::PingIqConfig;

const DEFAULT_DESCRIPTION: &str = "Health, diagnostics and metrics endpoints provided by PingIQ.";

fn json_resp(schema: Value) -> Value {
    json!({
        "description": "Success",
        "content": { "application/json": { "schema": schema } },
    })
}

fn text_resp() -> Value {
    json!({
        "description": "Success",
        "content": { "text/plain": { "schema": { "type": "string" } } },
    })
}

fn binary_resp(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/octet-stream": { "schema": { "type": "string", "format": "binary" } }
        },
    })
}

fn error_resp(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "type": "object", "properties": { "error": { "type": "string" } } }
            }
        },
    })
}

fn timestamp_schema() -> Value {
    json!({ "type": "string", "format": "date-time" })
}

/// Path item for one endpoint; `None` for endpoints left out of the document.
fn operation(cfg: &PingIqConfig, endpoint: Endpoint) -> Option<Value> {
    let op = match endpoint {
        Endpoint::Root => json!({ "summary": "Liveness (OK)", "responses": { "200": text_resp() } }),
        Endpoint::Health | Endpoint::Healthz => {
            json!({ "summary": "Liveness (ok)", "responses": { "200": text_resp() } })
        }
        Endpoint::Ping => json!({
            "summary": "Ping",
            "responses": { "200": json_resp(json!({
                "type": "object",
                "properties": {
                    "status": { "type": "string" },
                    "message": { "type": "string" },
                    "timestamp": timestamp_schema(),
                }
            })) },
        }),
        Endpoint::Time => json!({
            "summary": "Server time (UTC)",
            "responses": { "200": json_resp(json!({
                "type": "object",
                "properties": { "timestamp": timestamp_schema() }
            })) },
        }),
        Endpoint::Info => json!({
            "summary": "Service info",
            "responses": { "200": json_resp(json!({ "type": "object", "additionalProperties": true })) },
        }),
        Endpoint::Readiness => {
            let report = json!({
                "type": "object",
                "properties": {
                    "status": { "type": "string", "enum": ["ok", "degraded", "fail"] },
                    "timestamp": timestamp_schema(),
                    "checks": { "type": "array", "items": { "type": "object", "additionalProperties": true } },
                }
            });
            json!({
                "summary": "Readiness (detailed checks)",
                "responses": {
                    "200": json_resp(report.clone()),
                    "503": { "description": "Not ready", "content": { "application/json": { "schema": report } } },
                },
            })
        }
        Endpoint::Metrics => json!({ "summary": "Prometheus metrics", "responses": { "200": text_resp() } }),
        Endpoint::DiagnosticsNetwork => {
            if !cfg.diagnostics.enable_throughput {
                return None;
            }
            json!({
                "summary": "Download throughput payload",
                "parameters": [
                    { "name": "payload", "in": "query", "required": false,
                      "schema": { "type": "integer", "minimum": 0, "maximum": cfg.diagnostics.max_payload_bytes } }
                ],
                "responses": {
                    "200": binary_resp("Binary payload for bandwidth measurement"),
                    "429": error_resp("Too Many Requests"),
                },
            })
        }
        Endpoint::DiagnosticsLatency => json!({
            "summary": "Tiny payload for RTT measurement",
            "responses": {
                "200": binary_resp("Single-byte payload"),
                "429": error_resp("Too Many Requests"),
            },
        }),
        Endpoint::Env => {
            if !cfg.env.enabled {
                return None;
            }
            json!({
                "summary": "Allow-listed environment variables",
                "responses": { "200": json_resp(json!({
                    "type": "object",
                    "additionalProperties": { "type": "string" }
                })) },
            })
        }
        Endpoint::OpenApi => return None,
        Endpoint::MaintenanceEnable | Endpoint::MaintenanceDisable => {
            let summary = if endpoint == Endpoint::MaintenanceEnable {
                "Enable maintenance mode (readiness fails)"
            } else {
                "Disable maintenance mode"
            };
            json!({
                "summary": summary,
                "responses": { "200": json_resp(json!({
                    "type": "object",
                    "properties": { "maintenance": { "type": "boolean" } }
                })) },
            })
        }
    };
    Some(op)
}

/// Build the document for `cfg`. `/env` appears only when enabled.
pub fn generate(cfg: &PingIqConfig) -> Value {
    let base = cfg.base_prefix();
    let name = cfg.info.name.as_deref();
    let oa = &cfg.openapi;

    let title = oa
        .title
        .clone()
        .unwrap_or_else(|| name.map_or_else(|| "PingIQ".to_string(), |n| format!("{n} - PingIQ")));
    let version = oa
        .version
        .clone()
        .or_else(|| cfg.info.version.clone())
        .unwrap_or_else(|| "0.1.0".to_string());
    let description = oa
        .description
        .clone()
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

    let mut paths = Map::new();
    for endpoint in Endpoint::ALL {
        let Some(op) = operation(cfg, endpoint) else { continue };
        let path = format!("{base}{}", endpoint.suffix());
        let method = endpoint.method().to_ascii_lowercase();
        let item = paths
            .entry(path)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(item) = item {
            item.insert(method, op);
        }
    }

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": title,
            "version": version,
            "description": description,
        },
        "servers": oa.servers,
        "paths": paths,
        "components": {},
    })
}
