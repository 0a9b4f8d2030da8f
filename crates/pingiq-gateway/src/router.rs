//! Axum adapter: translates between axum requests/responses and the core
//! contract. Holds no state beyond the [`PingIq`] handle.
//!
//! The router uses a single fallback so the base path stays a pipeline
//! concern; hosts mount it with `merge`/`nest` next to their own routes.

use std::net::SocketAddr;

use axum::{
    body::{to_bytes, Body},
    extract::{ConnectInfo, Query, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};

use pingiq_core::protocol::{HandlerRequest, HandlerResponse};

use crate::{app_state::PingIq, ops};

/// Request bodies are never needed by the endpoints; cap what we buffer.
const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn build_router(app: PingIq) -> Router {
    Router::new().fallback(serve).with_state(app)
}

async fn serve(State(app): State<PingIq>, request: Request) -> Response {
    let req = match into_handler_request(request).await {
        Ok(req) => req,
        Err(resp) => return resp,
    };
    into_axum_response(ops::dispatch(&app, &req).await)
}

async fn into_handler_request(request: Request) -> Result<HandlerRequest, Response> {
    let (parts, body) = request.into_parts();
    let url = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let mut req = HandlerRequest::new(parts.method.as_str(), url);
    // Prefer axum's percent-decoding over the naive split done by `new`.
    if let Ok(Query(pairs)) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri) {
        req.query.clear();
        for (k, v) in pairs {
            req.append_query(&k, v);
        }
    }
    for (name, value) in &parts.headers {
        if let Ok(v) = value.to_str() {
            req.append_header(name.as_str(), v);
        }
    }
    if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
        req.ip = Some(addr.ip().to_string());
    }

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE.into_response())?;
    if !body.is_empty() {
        req.body = Some(body);
    }
    Ok(req)
}

fn into_axum_response(res: HandlerResponse) -> Response {
    let (status, headers, body) = res.into_parts();
    let mut builder = Response::builder().status(status);
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    builder.body(Body::from(body)).unwrap_or_else(|e| {
        tracing::error!(error = %e, "response conversion failed");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}
