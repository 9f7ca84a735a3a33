//! callcast gateway library entry.
//!
//! This crate wires the ACL policy, interceptor chain, call-event dispatcher,
//! stream sessions, and HTTP/WebSocket transport into one gateway. It is
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod intercept;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod router;
pub mod services;
pub mod sessions;
pub mod transport;
