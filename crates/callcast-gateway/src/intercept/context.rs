use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue};

use callcast_core::error::{CallcastError, Result};

use crate::context::CONSUMER_KEY;

/// What the transport knows about an inbound call.
#[derive(Debug, Clone, Default)]
pub struct CallMeta {
    /// Fully-qualified method, `Service/Method`.
    pub method: String,
    pub metadata: HeaderMap,
    pub peer: Option<SocketAddr>,
}

impl CallMeta {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Self::default()
        }
    }

    pub fn with_metadata(mut self, metadata: HeaderMap) -> Self {
        self.metadata = metadata;
        self
    }

    /// Append a consumer identity value. Values that are not valid header
    /// text are skipped (and then fail authentication).
    pub fn with_consumer(mut self, consumer: &str) -> Self {
        if let Ok(v) = HeaderValue::from_str(consumer) {
            self.metadata.append(CONSUMER_KEY, v);
        }
        self
    }

    pub fn with_peer(mut self, peer: SocketAddr) -> Self {
        self.peer = Some(peer);
        self
    }
}

/// Mutable state threaded through the stages.
#[derive(Debug, Clone)]
pub struct InterceptContext {
    pub method: Arc<str>,
    pub consumer: Option<Arc<str>>,
    pub peer: Option<SocketAddr>,
}

impl InterceptContext {
    pub fn from_meta(meta: &CallMeta) -> Self {
        Self {
            method: Arc::from(meta.method.as_str()),
            consumer: None,
            peer: meta.peer,
        }
    }

    pub(crate) fn into_call_context(self) -> Result<CallContext> {
        let consumer = self
            .consumer
            .ok_or_else(|| CallcastError::Internal("chain finished without consumer".into()))?;
        Ok(CallContext {
            method: self.method,
            consumer,
            peer: self.peer,
        })
    }
}

/// An admitted call, handed to the handler.
#[derive(Debug, Clone)]
pub struct CallContext {
    method: Arc<str>,
    consumer: Arc<str>,
    peer: Option<SocketAddr>,
}

impl CallContext {
    pub fn method(&self) -> &str { &self.method }
    pub fn consumer(&self) -> &str { &self.consumer }
    pub fn consumer_arc(&self) -> Arc<str> { Arc::clone(&self.consumer) }
    pub fn peer(&self) -> Option<SocketAddr> { self.peer }

    /// Peer address as text, `"unknown"` when the transport had none.
    pub fn peer_label(&self) -> String {
        self.peer
            .map(|p| p.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}
