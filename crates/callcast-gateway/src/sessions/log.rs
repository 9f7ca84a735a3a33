use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use callcast_core::error::Result;
use callcast_core::protocol::LogRecord;

use crate::dispatch::{Dispatcher, SubscriptionKind};

use super::sink::RecordSink;
use super::ActiveGuard;

/// Streams every other consumer's calls, one record per call.
pub struct LogSession {
    consumer: Arc<str>,
    peer: String,
}

impl LogSession {
    /// `peer` is this session's remote address; it is stamped into every
    /// record as `host`.
    pub fn new(consumer: impl Into<Arc<str>>, peer: impl Into<String>) -> Self {
        Self {
            consumer: consumer.into(),
            peer: peer.into(),
        }
    }

    /// Run until cancellation (Ok), inbox closure (Ok), or a failed send (Err).
    pub async fn run<S>(self, dispatcher: &Dispatcher, mut sink: S, cancel: CancellationToken) -> Result<()>
    where
        S: RecordSink<LogRecord>,
    {
        let metrics = dispatcher.metrics();
        let labels = [("kind", SubscriptionKind::Log.as_str())];

        let mut inbox = dispatcher.register_log(Arc::clone(&self.consumer));
        let _active = ActiveGuard::enter(metrics, SubscriptionKind::Log);
        tracing::info!(consumer = %self.consumer, peer = %self.peer, "log session streaming");

        let res = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break Ok(()),
                maybe = inbox.recv() => {
                    let Some(ev) = maybe else {
                        tracing::info!(consumer = %self.consumer, "log inbox closed");
                        break Ok(());
                    };
                    let record = LogRecord::from_event(&ev, &self.peer);
                    if let Err(e) = sink.send(record).await {
                        metrics.delivery_failures.inc(&labels);
                        break Err(e);
                    }
                }
            }
        };

        inbox.close();
        match &res {
            Ok(()) => tracing::info!(consumer = %self.consumer, "log session closed"),
            Err(e) => tracing::warn!(consumer = %self.consumer, error = %e, "log session aborted"),
        }
        res
    }
}
