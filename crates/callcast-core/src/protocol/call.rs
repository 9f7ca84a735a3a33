//! Call events.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Immutable record of one authorized call.
///
/// Built once by the interceptor chain and shared (`Arc`) across every
/// subscriber inbox during fan-out; nothing mutates it after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEvent {
    /// Fully-qualified method name, `Service/Method`.
    pub method: Arc<str>,
    /// Consumer identity that made the call.
    pub consumer: Arc<str>,
    /// Unix seconds at admission time.
    pub timestamp: i64,
    /// Peer address of the caller, when the transport knows it.
    pub origin_host: Option<Arc<str>>,
}

impl CallEvent {
    pub fn new(method: impl Into<Arc<str>>, consumer: impl Into<Arc<str>>) -> Self {
        Self {
            method: method.into(),
            consumer: consumer.into(),
            timestamp: unix_now(),
            origin_host: None,
        }
    }

    pub fn with_origin(mut self, host: impl Into<Arc<str>>) -> Self {
        self.origin_host = Some(host.into());
        self
    }

    /// True when `consumer` made this call.
    pub fn is_from(&self, consumer: &str) -> bool {
        &*self.consumer == consumer
    }
}

/// Current unix time in seconds (0 if the clock is before the epoch).
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
