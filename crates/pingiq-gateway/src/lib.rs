//! PingIQ gateway library entry.
//!
//! This crate wires the readiness engine, rate limiter, metrics registry and
//! request pipeline into one composition root ([`app_state::PingIq`]) that any
//! HTTP framework can mount. An axum adapter ships in [`router`]; the binary
//! (`main.rs`) and integration tests consume the same API.

pub mod app_state;
pub mod config;
pub mod hooks;
pub mod lifecycle;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod readiness;
pub mod router;

pub use app_state::{PingIq, PingIqBuilder};
