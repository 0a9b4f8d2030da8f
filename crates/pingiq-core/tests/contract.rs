//! Request/response contract and health vocabulary.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use pingiq_core::protocol::{
    FieldValue, HandlerRequest, HandlerResponse, HealthStatus, ReadinessCheckResult, ReadinessReport,
};

#[test]
fn request_splits_query_and_normalizes_headers() {
    let req = HandlerRequest::get("/diagnostics/network?payload=128&x=1&x=2")
        .with_header("X-Forwarded-For", "1.2.3.4")
        .with_ip("127.0.0.1");

    assert_eq!(req.method, "GET");
    assert_eq!(req.path(), "/diagnostics/network");
    assert_eq!(req.query_param("payload"), Some("128"));
    assert_eq!(
        req.query.get("x"),
        Some(&FieldValue::Many(vec!["1".into(), "2".into()]))
    );
    assert_eq!(req.header("x-forwarded-for"), Some("1.2.3.4"));

    let ctx = req.context();
    assert_eq!(ctx.header("X-FORWARDED-FOR"), Some("1.2.3.4"));
    assert_eq!(ctx.ip, Some("127.0.0.1"));
}

#[test]
fn responses_carry_hardened_headers() {
    let responses = [
        HandlerResponse::ok_json(&serde_json::json!({ "a": 1 })),
        HandlerResponse::text(200, "ok"),
        HandlerResponse::not_found(),
        HandlerResponse::unauthorized(),
        HandlerResponse::too_many_requests(),
    ];
    for res in responses {
        assert_eq!(res.header("cache-control"), Some("no-store"));
        assert_eq!(res.header("pragma"), Some("no-cache"));
        assert_eq!(res.header("x-content-type-options"), Some("nosniff"));
        assert!(res.header("content-type").is_some());
    }
}

#[test]
fn error_bodies_have_single_message() {
    let res = HandlerResponse::too_many_requests();
    assert_eq!(res.status(), 429);
    assert_eq!(res.header("content-type"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body, serde_json::json!({ "error": "Too Many Requests" }));
}

#[test]
fn with_header_replaces_existing() {
    let res = HandlerResponse::text(200, "x").with_header("Content-Type", "text/other");
    assert_eq!(res.header("content-type"), Some("text/other"));
    assert_eq!(res.headers().iter().filter(|(k, _)| k == "content-type").count(), 1);
}

#[test]
fn aggregate_status_rules() {
    use HealthStatus::{Degraded, Fail, Ok as Pass};
    let none: [HealthStatus; 0] = [];
    assert_eq!(HealthStatus::aggregate(&none), Pass);
    assert_eq!(HealthStatus::aggregate(&[Pass, Pass]), Pass);
    assert_eq!(HealthStatus::aggregate(&[Pass, Degraded]), Degraded);
    assert_eq!(HealthStatus::aggregate(&[Degraded, Fail, Pass]), Fail);
}

#[test]
fn health_json_vocabulary() {
    assert_eq!(HealthStatus::Ok.as_health_json(), "pass");
    assert_eq!(HealthStatus::Degraded.as_health_json(), "warn");
    assert_eq!(HealthStatus::Fail.as_health_json(), "fail");
}

#[test]
fn check_result_serializes_camel_case_and_skips_empty() {
    let r = ReadinessCheckResult::fail("db", "connection refused").with_duration_ms(12);
    let v = serde_json::to_value(&r).unwrap();
    assert_eq!(
        v,
        serde_json::json!({ "name": "db", "status": "fail", "durationMs": 12, "error": "connection refused" })
    );
}

#[test]
fn maintenance_report_shape() {
    let v = serde_json::to_value(ReadinessReport::maintenance()).unwrap();
    assert_eq!(
        v,
        serde_json::json!({ "status": "fail", "checks": [{ "name": "maintenance", "status": "fail" }] })
    );
}
