//! Policy layer (per-consumer method ACL).
//!
//! Compiles the ACL configuration into pattern lists that the interceptor
//! chain consults on every call.

pub mod acl;
pub mod engine;

pub use engine::{AccessPolicy, DenyReason, PolicyDecision};
