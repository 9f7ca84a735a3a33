use std::collections::BTreeMap;
use std::mem;
use std::sync::Arc;

use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use callcast_core::error::{CallcastError, Result};
use callcast_core::protocol::{unix_now, CallEvent, StatSnapshot};

use crate::dispatch::{Dispatcher, SubscriptionKind};

use super::sink::RecordSink;
use super::ActiveGuard;

/// Per-window call counters.
#[derive(Debug, Default)]
pub struct StatsAccumulator {
    by_method: BTreeMap<String, u64>,
    by_consumer: BTreeMap<String, u64>,
}

impl StatsAccumulator {
    pub fn record(&mut self, ev: &CallEvent) {
        *self.by_method.entry(ev.method.to_string()).or_default() += 1;
        *self.by_consumer.entry(ev.consumer.to_string()).or_default() += 1;
    }

    /// Take the current window and start an empty one.
    pub fn flush(&mut self) -> StatSnapshot {
        StatSnapshot {
            timestamp: unix_now(),
            by_method: mem::take(&mut self.by_method),
            by_consumer: mem::take(&mut self.by_consumer),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_method.is_empty()
    }
}

/// Longest accepted flush interval (one day).
pub const MAX_INTERVAL_SECONDS: u64 = 86_400;

/// Counts other consumers' calls and flushes a snapshot every interval.
pub struct StatsSession {
    consumer: Arc<str>,
    period: Duration,
}

impl StatsSession {
    /// `interval_seconds` must be in `1..=MAX_INTERVAL_SECONDS`.
    pub fn new(consumer: impl Into<Arc<str>>, interval_seconds: u64) -> Result<Self> {
        if !(1..=MAX_INTERVAL_SECONDS).contains(&interval_seconds) {
            return Err(CallcastError::InvalidArgument(format!(
                "interval_seconds must be between 1 and {MAX_INTERVAL_SECONDS}"
            )));
        }
        Ok(Self {
            consumer: consumer.into(),
            period: Duration::from_secs(interval_seconds),
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run until cancellation (Ok), inbox closure (Ok), or a failed send (Err).
    pub async fn run<S>(self, dispatcher: &Dispatcher, mut sink: S, cancel: CancellationToken) -> Result<()>
    where
        S: RecordSink<StatSnapshot>,
    {
        let metrics = dispatcher.metrics();
        let labels = [("kind", SubscriptionKind::Stats.as_str())];

        let mut inbox = dispatcher.register_stats(Arc::clone(&self.consumer));
        let _active = ActiveGuard::enter(metrics, SubscriptionKind::Stats);

        // first flush one full period after start
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut acc = StatsAccumulator::default();
        tracing::info!(consumer = %self.consumer, period_secs = self.period.as_secs(), "stats session accumulating");

        let res = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break Ok(()),
                _ = ticker.tick() => {
                    let snapshot = acc.flush();
                    if let Err(e) = sink.send(snapshot).await {
                        metrics.delivery_failures.inc(&labels);
                        break Err(e);
                    }
                }
                maybe = inbox.recv() => match maybe {
                    Some(ev) => acc.record(&ev),
                    None => {
                        tracing::info!(consumer = %self.consumer, "stats inbox closed");
                        break Ok(());
                    }
                },
            }
        };

        inbox.close();
        match &res {
            Ok(()) => tracing::info!(consumer = %self.consumer, "stats session closed"),
            Err(e) => tracing::warn!(consumer = %self.consumer, error = %e, "stats session aborted"),
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_resets_window() {
        let mut acc = StatsAccumulator::default();
        acc.record(&CallEvent::new("Biz/Check", "x"));
        acc.record(&CallEvent::new("Biz/Check", "x"));
        acc.record(&CallEvent::new("Biz/Add", "y"));

        let snap = acc.flush();
        assert_eq!(snap.by_method.get("Biz/Check"), Some(&2));
        assert_eq!(snap.by_method.get("Biz/Add"), Some(&1));
        assert_eq!(snap.by_consumer.get("x"), Some(&2));
        assert_eq!(snap.by_consumer.get("y"), Some(&1));

        assert!(acc.is_empty());
        let next = acc.flush();
        assert!(next.by_method.is_empty());
        assert!(next.by_consumer.is_empty());
    }

    #[test]
    fn zero_interval_rejected() {
        let err = StatsSession::new("stat", 0).err().unwrap();
        assert_eq!(err.client_code().as_str(), "INVALID_ARGUMENT");
        assert_eq!(StatsSession::new("stat", 2).unwrap().period(), Duration::from_secs(2));
    }

    #[test]
    fn oversized_interval_rejected() {
        for secs in [MAX_INTERVAL_SECONDS + 1, u64::MAX] {
            let err = StatsSession::new("stat", secs).err().unwrap();
            assert_eq!(err.client_code().as_str(), "INVALID_ARGUMENT");
        }
        let max = StatsSession::new("stat", MAX_INTERVAL_SECONDS).unwrap();
        assert_eq!(max.period(), Duration::from_secs(MAX_INTERVAL_SECONDS));
    }
}
