//! Host-supplied collaborators for the request pipeline.
//!
//! Each collaborator is a small capability trait; the pipeline only sees
//! `Arc<dyn ...>` handles and never inspects their shape at runtime.

use std::future::Future;

use async_trait::async_trait;

use pingiq_core::error::PingIqError;
use pingiq_core::protocol::RequestContext;

/// Decides whether a request may reach a guarded endpoint.
#[async_trait]
pub trait AuthCheck: Send + Sync {
    async fn authorize(&self, ctx: &RequestContext<'_>) -> bool;
}

/// Auth predicate built from an async closure.
pub struct FnAuth<F> {
    f: F,
}

impl<F> FnAuth<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> AuthCheck for FnAuth<F>
where
    F: Fn(String, Option<String>) -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send,
{
    /// The closure receives the `authorization` header and the peer address.
    async fn authorize(&self, ctx: &RequestContext<'_>) -> bool {
        let auth = ctx.header("authorization").unwrap_or_default().to_string();
        (self.f)(auth, ctx.ip.map(str::to_string)).await
    }
}

/// Static bearer token check.
pub struct BearerToken {
    expected: String,
}

impl BearerToken {
    pub fn new(token: impl AsRef<str>) -> Self {
        Self {
            expected: format!("Bearer {}", token.as_ref()),
        }
    }
}

#[async_trait]
impl AuthCheck for BearerToken {
    async fn authorize(&self, ctx: &RequestContext<'_>) -> bool {
        ctx.header("authorization") == Some(self.expected.as_str())
    }
}

/// Request lifecycle observers. Every method defaults to a no-op.
pub trait LoggingHooks: Send + Sync {
    fn on_request(&self, _ctx: &RequestContext<'_>) {}
    fn on_response(&self, _ctx: &RequestContext<'_>, _status: u16) {}
    fn on_error(&self, _ctx: &RequestContext<'_>, _err: &PingIqError) {}
}

/// Hooks that forward to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHooks;

impl LoggingHooks for TracingHooks {
    fn on_request(&self, ctx: &RequestContext<'_>) {
        tracing::debug!(method = %ctx.method, url = %ctx.url, ip = ?ctx.ip, "pingiq request");
    }

    fn on_response(&self, ctx: &RequestContext<'_>, status: u16) {
        tracing::info!(method = %ctx.method, url = %ctx.url, status, "pingiq response");
    }

    fn on_error(&self, ctx: &RequestContext<'_>, err: &PingIqError) {
        tracing::warn!(method = %ctx.method, url = %ctx.url, error = %err, "pingiq error");
    }
}
