//! Lightweight in-process metrics (dependency-free).
//!
//! Counters, gauges and a fixed-bucket histogram stored as atomics behind
//! `DashMap` label keys, rendered by the `/metrics` handler.

pub mod metrics;

pub use metrics::GatewayMetrics;
