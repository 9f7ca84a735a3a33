//! Per-call identity shared across layers.
//!
//! Resolves the consumer identity from call metadata without coupling the
//! interceptor chain to a specific transport request type.

pub mod consumer;

pub use consumer::{resolve_consumer, CONSUMER_KEY};
