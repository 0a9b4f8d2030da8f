//! PingIQ core: transport-agnostic request/response contract, health
//! vocabulary, error types and deterministic helpers.
//!
//! This crate defines the contract every framework adapter speaks with the
//! gateway engine. It carries no runtime dependencies so adapters, clients and
//! tests can reuse it without pulling in an async executor.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! All fallible paths must surface as `PingIqError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;
pub mod util;

/// Shared result type.
pub use error::{PingIqError, Result};
