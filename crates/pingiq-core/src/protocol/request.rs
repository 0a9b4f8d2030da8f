//! Request contract consumed from framework adapters.
//!
//! Header names are stored lowercased so lookups are case-insensitive.

use std::collections::HashMap;

use bytes::Bytes;

/// A header or query value: HTTP allows both to repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    One(String),
    Many(Vec<String>),
}

impl FieldValue {
    /// First value, the only one the pipeline ever consults.
    pub fn first(&self) -> Option<&str> {
        match self {
            FieldValue::One(v) => Some(v.as_str()),
            FieldValue::Many(vs) => vs.first().map(String::as_str),
        }
    }

    /// All values joined with `", "` (HTTP list semantics).
    pub fn joined(&self) -> String {
        match self {
            FieldValue::One(v) => v.clone(),
            FieldValue::Many(vs) => vs.join(", "),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            FieldValue::One(v) => *self = FieldValue::Many(vec![std::mem::take(v), value]),
            FieldValue::Many(vs) => vs.push(value),
        }
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::One(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::One(v.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(v: Vec<String>) -> Self {
        FieldValue::Many(v)
    }
}

/// Normalized inbound request.
#[derive(Debug, Clone, Default)]
pub struct HandlerRequest {
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, FieldValue>,
    pub query: HashMap<String, FieldValue>,
    pub body: Option<Bytes>,
    /// Transport-level peer address, if the adapter knows it.
    pub ip: Option<String>,
}

impl HandlerRequest {
    /// Build a request; any `?a=b&c=d` suffix of `url` is split into `query`.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        let mut req = Self {
            method: method.into().to_ascii_uppercase(),
            ..Self::default()
        };
        if let Some((_, qs)) = url.split_once('?') {
            for pair in qs.split('&').filter(|p| !p.is_empty()) {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                req.append_query(k, v);
            }
        }
        req.url = url;
        req
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new("POST", url)
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.append_header(name, value);
        self
    }

    pub fn with_query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.append_query(name, value);
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Add a header value, turning repeated names into a list.
    pub fn append_header(&mut self, name: &str, value: impl Into<String>) {
        append(&mut self.headers, name.to_ascii_lowercase(), value.into());
    }

    pub fn append_query(&mut self, name: &str, value: impl Into<String>) {
        append(&mut self.query, name.to_string(), value.into());
    }

    /// First value of a header (case-insensitive name).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(FieldValue::first)
    }

    /// First value of a query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).and_then(FieldValue::first)
    }

    /// URL without the query string.
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or("")
    }

    /// Borrowed view handed to auth predicates and logging hooks.
    pub fn context(&self) -> RequestContext<'_> {
        RequestContext {
            method: &self.method,
            url: &self.url,
            headers: &self.headers,
            ip: self.ip.as_deref(),
        }
    }
}

fn append(map: &mut HashMap<String, FieldValue>, key: String, value: String) {
    match map.get_mut(&key) {
        Some(existing) => existing.push(value),
        None => {
            map.insert(key, FieldValue::One(value));
        }
    }
}

/// What collaborators (auth, logging) get to see of a request.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub headers: &'a HashMap<String, FieldValue>,
    pub ip: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn header(&self, name: &str) -> Option<&'a str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(FieldValue::first)
    }
}
