//! Outbound stream records (JSON).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::call::{unix_now, CallEvent};

/// One entry on the log stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: i64,
    pub consumer: String,
    pub method: String,
    /// Peer address of the log session that receives this record.
    pub host: String,
}

impl LogRecord {
    /// Stamp `ev` for delivery to a session connected from `host`.
    pub fn from_event(ev: &CallEvent, host: &str) -> Self {
        Self {
            timestamp: unix_now(),
            consumer: ev.consumer.to_string(),
            method: ev.method.to_string(),
            host: host.to_string(),
        }
    }
}

/// One flushed statistics window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSnapshot {
    pub timestamp: i64,
    #[serde(default)]
    pub by_method: BTreeMap<String, u64>,
    #[serde(default)]
    pub by_consumer: BTreeMap<String, u64>,
}

/// Statistics stream parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatInterval {
    pub interval_seconds: u64,
}
