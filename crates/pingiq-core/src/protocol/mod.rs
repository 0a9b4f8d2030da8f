//! Core/adapter contract.
//!
//! - `request`  : what an adapter hands to the pipeline
//! - `response` : what the pipeline hands back (hardened headers built in)
//! - `health`   : readiness vocabulary shared by checks, engine and clients

pub mod health;
pub mod request;
pub mod response;

pub use health::{HealthStatus, ReadinessCheckResult, ReadinessReport};
pub use request::{FieldValue, HandlerRequest, RequestContext};
pub use response::HandlerResponse;
