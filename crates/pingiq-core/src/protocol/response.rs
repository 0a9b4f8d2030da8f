//! Response contract produced for framework adapters.
//!
//! Every constructor attaches the hardened header set (`no-store`, `no-cache`,
//! `nosniff`, explicit content type). Endpoints cannot opt out.

use bytes::Bytes;
use serde_json::{json, Value};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";
pub const CONTENT_TYPE_METRICS: &str = "text/plain; version=0.0.4";
pub const CONTENT_TYPE_BINARY: &str = "application/octet-stream";

/// Server-side processing time, in milliseconds.
pub const HEADER_SERVER_DURATION_MS: &str = "x-pingiq-server-duration-ms";
/// Size of the diagnostics payload actually sent.
pub const HEADER_PAYLOAD_BYTES: &str = "x-pingiq-payload-bytes";

/// Normalized outbound response. Built once, then only read.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl HandlerResponse {
    fn hardened(status: u16, content_type: &str, body: Bytes) -> Self {
        Self {
            status,
            headers: vec![
                ("content-type".to_string(), content_type.to_string()),
                ("cache-control".to_string(), "no-store".to_string()),
                ("pragma".to_string(), "no-cache".to_string()),
                ("x-content-type-options".to_string(), "nosniff".to_string()),
            ],
            body,
        }
    }

    pub fn json(status: u16, value: &Value) -> Self {
        Self::hardened(status, CONTENT_TYPE_JSON, Bytes::from(value.to_string()))
    }

    pub fn ok_json(value: &Value) -> Self {
        Self::json(200, value)
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::hardened(status, CONTENT_TYPE_TEXT, Bytes::from(body.into()))
    }

    pub fn metrics(body: String) -> Self {
        Self::hardened(200, CONTENT_TYPE_METRICS, Bytes::from(body))
    }

    pub fn binary(body: Bytes) -> Self {
        Self::hardened(200, CONTENT_TYPE_BINARY, body)
    }

    /// `{error: <message>}` with the given status.
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, &json!({ "error": message }))
    }

    pub fn not_found() -> Self {
        Self::error(404, "Not Found")
    }

    pub fn unauthorized() -> Self {
        Self::error(401, "Unauthorized")
    }

    pub fn too_many_requests() -> Self {
        Self::error(429, "Too Many Requests")
    }

    pub fn internal_error() -> Self {
        Self::error(500, "Internal Server Error")
    }

    /// Add or replace a header (name is lowercased).
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name, value)),
        }
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as UTF-8 text (lossy), convenient for JSON and text endpoints.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn into_parts(self) -> (u16, Vec<(String, String)>, Bytes) {
        (self.status, self.headers, self.body)
    }
}
