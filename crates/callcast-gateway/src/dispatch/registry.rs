use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use callcast_core::protocol::CallEvent;

/// Which stream a subscription feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionKind {
    Log,
    Stats,
}

impl SubscriptionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionKind::Log => "log",
            SubscriptionKind::Stats => "stats",
        }
    }
}

impl fmt::Display for SubscriptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry key: one live subscription per consumer and kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionKey {
    pub consumer: Arc<str>,
    pub kind: SubscriptionKind,
}

impl SubscriptionKey {
    pub fn new(consumer: impl Into<Arc<str>>, kind: SubscriptionKind) -> Self {
        Self { consumer: consumer.into(), kind }
    }
}

/// One registered inbox sender.
#[derive(Clone)]
pub struct Subscriber {
    pub key: SubscriptionKey,
    pub id: u64,
    pub tx: mpsc::Sender<Arc<CallEvent>>,
}

/// Outcome of an insert.
pub struct Inserted {
    pub id: u64,
    /// Previous holder of the same key, already removed from the registry.
    pub evicted: Option<Subscriber>,
}

/// Subscriber registry: `{consumer, kind} -> inbox sender`.
///
/// A single mutex guards the map. It is only held to insert, remove, or copy
/// a snapshot; fan-out iterates the snapshot with the lock released.
pub struct SubscriberRegistry {
    entries: Mutex<HashMap<SubscriptionKey, Subscriber>>,
    seq: AtomicU64,
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            seq: AtomicU64::new(1),
        }
    }

    // A poisoned lock only means another thread panicked mid-update of a
    // HashMap insert/remove; the map itself is still consistent.
    fn entries(&self) -> MutexGuard<'_, HashMap<SubscriptionKey, Subscriber>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert `tx` under `key`, evicting any current holder (last registration wins).
    pub fn insert(&self, key: SubscriptionKey, tx: mpsc::Sender<Arc<CallEvent>>) -> Inserted {
        let id = self.seq.fetch_add(1, Ordering::Relaxed);
        let sub = Subscriber { key: key.clone(), id, tx };
        let evicted = self.entries().insert(key, sub);
        Inserted { id, evicted }
    }

    /// Remove whatever is registered under `key`.
    pub fn remove(&self, key: &SubscriptionKey) -> Option<Subscriber> {
        self.entries().remove(key)
    }

    /// Remove `key` only if it still belongs to registration `id`.
    pub fn remove_if_current(&self, key: &SubscriptionKey, id: u64) -> bool {
        let mut entries = self.entries();
        match entries.get(key) {
            Some(sub) if sub.id == id => {
                entries.remove(key);
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, key: &SubscriptionKey) -> bool {
        self.entries().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every current subscriber, taken under the lock.
    pub fn snapshot(&self) -> Vec<Subscriber> {
        self.entries().values().cloned().collect()
    }

    /// Drop every sender, closing all inboxes. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let drained: Vec<Subscriber> = self.entries().drain().map(|(_, s)| s).collect();
        drained.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: &str, kind: SubscriptionKind) -> SubscriptionKey {
        SubscriptionKey::new(c, kind)
    }

    #[test]
    fn insert_evicts_same_key_only() {
        let reg = SubscriberRegistry::new();
        let (tx1, _rx1) = mpsc::channel(1);
        let (tx2, _rx2) = mpsc::channel(1);
        let (tx3, _rx3) = mpsc::channel(1);

        let first = reg.insert(key("a", SubscriptionKind::Log), tx1);
        assert!(first.evicted.is_none());

        let stats = reg.insert(key("a", SubscriptionKind::Stats), tx2);
        assert!(stats.evicted.is_none());

        let second = reg.insert(key("a", SubscriptionKind::Log), tx3);
        let evicted = second.evicted.unwrap();
        assert_eq!(evicted.id, first.id);
        assert_eq!(reg.len(), 2);
        assert!(!reg.remove_if_current(&key("a", SubscriptionKind::Log), first.id));
        assert!(reg.remove_if_current(&key("a", SubscriptionKind::Log), second.id));
    }

    #[test]
    fn remove_if_current_ignores_stale_id() {
        let reg = SubscriberRegistry::new();
        let (tx1, _rx1) = mpsc::channel(1);
        let (tx2, _rx2) = mpsc::channel(1);
        let k = key("a", SubscriptionKind::Log);

        let old = reg.insert(k.clone(), tx1);
        let new = reg.insert(k.clone(), tx2);

        assert!(!reg.remove_if_current(&k, old.id));
        assert!(reg.contains(&k));
        assert!(reg.remove_if_current(&k, new.id));
        assert!(!reg.remove_if_current(&k, new.id));
        assert!(reg.is_empty());
    }

    #[test]
    fn clear_closes_receivers() {
        let reg = SubscriberRegistry::new();
        let (tx, mut rx) = mpsc::channel::<Arc<CallEvent>>(1);
        reg.insert(key("a", SubscriptionKind::Stats), tx);

        assert_eq!(reg.clear(), 1);
        assert!(rx.try_recv().is_err());
        assert!(rx.blocking_recv().is_none());
    }
}
