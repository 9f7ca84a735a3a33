//! Long-lived stream sessions (log + statistics).
//!
//! Each session registers one inbox with the dispatcher, forwards what it
//! receives to a [`RecordSink`], and unregisters when its cancellation token
//! fires, its inbox closes, or a send fails.

pub mod log;
pub mod sink;
pub mod stats;

pub use log::LogSession;
pub use sink::RecordSink;
pub use stats::{StatsAccumulator, StatsSession};

use crate::dispatch::SubscriptionKind;
use crate::obs::GatewayMetrics;

/// Holds `sessions_active{kind}` up for as long as a session runs.
pub(crate) struct ActiveGuard<'a> {
    metrics: &'a GatewayMetrics,
    kind: SubscriptionKind,
}

impl<'a> ActiveGuard<'a> {
    pub(crate) fn enter(metrics: &'a GatewayMetrics, kind: SubscriptionKind) -> Self {
        metrics.sessions_active.inc(&[("kind", kind.as_str())]);
        Self { metrics, kind }
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.metrics.sessions_active.dec(&[("kind", self.kind.as_str())]);
    }
}
