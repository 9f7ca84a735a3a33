use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use callcast_core::error::{CallcastError, Result};
use callcast_core::protocol::CallEvent;

use crate::config::GatewaySection;
use crate::obs::GatewayMetrics;

use super::registry::{SubscriberRegistry, SubscriptionKey, SubscriptionKind};

/// Single-writer broadcaster between call admission and stream sessions.
///
/// `submit` pushes into one bounded intake queue. A single dispatch loop
/// drains it and copies each event into every registered inbox except the
/// ones owned by the event's own consumer, so all subscribers observe the
/// same total order.
///
/// Delivery into an inbox awaits capacity: a subscriber that stops reading
/// stalls the whole broadcast once its inbox fills. There is no drop policy.
pub struct Dispatcher {
    intake: mpsc::Sender<Arc<CallEvent>>,
    registry: Arc<SubscriberRegistry>,
    inbox_capacity: usize,
    metrics: Arc<GatewayMetrics>,
}

impl Dispatcher {
    /// Build the dispatcher and spawn its loop. The loop stops when
    /// `shutdown` is cancelled; stopping closes every registered inbox.
    pub fn spawn(
        cfg: &GatewaySection,
        metrics: Arc<GatewayMetrics>,
        shutdown: CancellationToken,
    ) -> (Arc<Self>, JoinHandle<()>) {
        let (intake, rx) = mpsc::channel(cfg.intake_capacity.max(1));
        let registry = Arc::new(SubscriberRegistry::new());

        let handle = tokio::spawn(run_loop(
            rx,
            Arc::clone(&registry),
            Arc::clone(&metrics),
            shutdown,
        ));

        let dispatcher = Arc::new(Self {
            intake,
            registry,
            inbox_capacity: cfg.inbox_capacity.max(1),
            metrics,
        });
        (dispatcher, handle)
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }

    /// Queue an event for fan-out. Waits only for intake capacity, never
    /// for delivery.
    pub async fn submit(&self, ev: CallEvent) -> Result<()> {
        self.intake
            .send(Arc::new(ev))
            .await
            .map_err(|_| CallcastError::Internal("dispatcher stopped".into()))
    }

    pub fn register_log(&self, consumer: impl Into<Arc<str>>) -> Inbox {
        self.register(consumer, SubscriptionKind::Log)
    }

    pub fn register_stats(&self, consumer: impl Into<Arc<str>>) -> Inbox {
        self.register(consumer, SubscriptionKind::Stats)
    }

    /// Create a fresh inbox for `{consumer, kind}`. A previous inbox under
    /// the same key is evicted and closes.
    pub fn register(&self, consumer: impl Into<Arc<str>>, kind: SubscriptionKind) -> Inbox {
        let key = SubscriptionKey::new(consumer, kind);
        let (tx, rx) = mpsc::channel(self.inbox_capacity);
        let inserted = self.registry.insert(key.clone(), tx);

        if let Some(old) = inserted.evicted {
            tracing::info!(consumer = %key.consumer, %kind, evicted_id = old.id, "subscription evicted by newer session");
            self.metrics.session_evictions.inc(&[("kind", kind.as_str())]);
        }
        tracing::debug!(consumer = %key.consumer, %kind, id = inserted.id, "subscription registered");

        Inbox {
            key,
            id: inserted.id,
            rx,
            registry: Arc::clone(&self.registry),
            metrics: Arc::clone(&self.metrics),
            released: false,
        }
    }

    /// Remove and close whatever inbox is registered under `{consumer, kind}`.
    /// Safe to call when nothing is registered.
    pub fn unregister(&self, consumer: &str, kind: SubscriptionKind) -> bool {
        self.registry
            .remove(&SubscriptionKey::new(consumer, kind))
            .is_some()
    }

    pub fn is_registered(&self, consumer: &str, kind: SubscriptionKind) -> bool {
        self.registry.contains(&SubscriptionKey::new(consumer, kind))
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }
}

async fn run_loop(
    mut rx: mpsc::Receiver<Arc<CallEvent>>,
    registry: Arc<SubscriberRegistry>,
    metrics: Arc<GatewayMetrics>,
    shutdown: CancellationToken,
) {
    tracing::info!("dispatcher started");
    loop {
        let ev = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            maybe = rx.recv() => match maybe {
                Some(ev) => ev,
                None => break,
            },
        };

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = fan_out(&ev, &registry, &metrics) => {}
        }
    }

    let closed = registry.clear();
    tracing::info!(closed, "dispatcher stopped");
}

async fn fan_out(ev: &Arc<CallEvent>, registry: &SubscriberRegistry, metrics: &GatewayMetrics) {
    let started = Instant::now();

    for sub in registry.snapshot() {
        // self-originated events are not shown to the caller's own sessions
        if ev.is_from(&sub.key.consumer) {
            continue;
        }
        if sub.tx.send(Arc::clone(ev)).await.is_err() {
            tracing::debug!(consumer = %sub.key.consumer, kind = %sub.key.kind, "inbox closed during fan-out");
            continue;
        }
        metrics.events_delivered.inc(&[("kind", sub.key.kind.as_str())]);
    }

    metrics.fanout_duration.observe(&[], started.elapsed());
}

/// Receiving end of one subscription.
///
/// Yields `None` once the subscription is evicted by a newer session for the
/// same key or the dispatcher stops. Closing (explicitly or on drop) removes
/// the registry entry only if it still belongs to this registration.
pub struct Inbox {
    key: SubscriptionKey,
    id: u64,
    rx: mpsc::Receiver<Arc<CallEvent>>,
    registry: Arc<SubscriberRegistry>,
    metrics: Arc<GatewayMetrics>,
    released: bool,
}

impl Inbox {
    pub fn key(&self) -> &SubscriptionKey {
        &self.key
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub async fn recv(&mut self) -> Option<Arc<CallEvent>> {
        self.rx.recv().await
    }

    /// Unregister and close this inbox.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.rx.close();
        let removed = self.registry.remove_if_current(&self.key, self.id);
        // an evicted registration was already replaced, nothing to count
        if removed {
            self.metrics.unregistrations.inc(&[("kind", self.key.kind.as_str())]);
        }
        tracing::debug!(consumer = %self.key.consumer, kind = %self.key.kind, id = self.id, removed, "subscription released");
    }
}

impl Drop for Inbox {
    fn drop(&mut self) {
        self.release();
    }
}
