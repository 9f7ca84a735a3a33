//! Top-level facade crate for callcast.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use callcast_core::*;
}

pub mod gateway {
    pub use callcast_gateway::*;
}
