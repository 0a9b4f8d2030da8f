//! Top-level facade crate for PingIQ.
//!
//! Re-exports the core contract and the gateway engine so hosts can depend on a single crate.

pub mod core {
    pub use pingiq_core::*;
}

pub mod gateway {
    pub use pingiq_gateway::*;
}

pub use pingiq_gateway::PingIq;
