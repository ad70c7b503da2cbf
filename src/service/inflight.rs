//! Keyed in-flight registry: at most one pending operation per key; its outcome is shared with
//! every caller that joined while it was pending.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

/// Deduplication key for one logical fetch: resource kind plus identifying path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FetchKey(String);

impl FetchKey {
    pub fn resource(path: &str) -> Self {
        FetchKey(format!("resource:{}", path))
    }

    pub fn child(child_id: &str) -> Self {
        FetchKey(format!("child_{}", child_id))
    }

    pub fn organization(organization_id: &str) -> Self {
        FetchKey(format!("institute_{}", organization_id))
    }

    pub fn class(organization_id: &str, class_id: &str) -> Self {
        FetchKey(format!("class_{}_{}", organization_id, class_id))
    }

    pub fn subject(organization_id: &str, class_id: &str, subject_id: &str) -> Self {
        FetchKey(format!("subject_{}_{}_{}", organization_id, class_id, subject_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FetchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct InFlight<T> {
    pending: Mutex<HashMap<FetchKey, watch::Receiver<Option<T>>>>,
}

/// Result of [`InFlight::claim`]: either this caller now owns the key, or someone else does.
pub enum Claim<T> {
    Leader(Pending<T>),
    Joined(Waiter<T>),
}

/// Ownership of a key. The key is released when this is settled or dropped; dropping without
/// settling wakes joiners with nothing.
pub struct Pending<T> {
    key: FetchKey,
    tx: watch::Sender<Option<T>>,
    registry: Arc<InFlight<T>>,
}

pub struct Waiter<T> {
    key: FetchKey,
    rx: watch::Receiver<Option<T>>,
}

impl<T> InFlight<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(InFlight {
            pending: Mutex::new(HashMap::new()),
        })
    }

    pub fn contains(&self, key: &FetchKey) -> bool {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, key: &FetchKey) {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).remove(key);
    }
}

impl<T: Clone> InFlight<T> {
    /// Register `key` as in flight, or join the operation already registered under it.
    pub fn claim(self: &Arc<Self>, key: FetchKey) -> Claim<T> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(rx) = pending.get(&key) {
            return Claim::Joined(Waiter {
                key,
                rx: rx.clone(),
            });
        }
        let (tx, rx) = watch::channel(None);
        pending.insert(key.clone(), rx);
        Claim::Leader(Pending {
            key,
            tx,
            registry: Arc::clone(self),
        })
    }
}

impl<T> Pending<T> {
    pub fn key(&self) -> &FetchKey {
        &self.key
    }

    /// Hand `value` to every joiner and release the key.
    pub fn settle(self, value: T) {
        self.tx.send_replace(Some(value));
    }
}

impl<T> Drop for Pending<T> {
    fn drop(&mut self) {
        self.registry.release(&self.key);
    }
}

impl<T: Clone> Waiter<T> {
    pub fn key(&self) -> &FetchKey {
        &self.key
    }

    /// The leader's outcome, or `None` if the leader was dropped before settling.
    pub async fn wait(mut self) -> Option<T> {
        match self.rx.wait_for(Option::is_some).await {
            Ok(value) => (*value).clone(),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn joiner_receives_leader_outcome() {
        let registry = InFlight::<u32>::new();
        let Claim::Leader(pending) = registry.claim(FetchKey::organization("A")) else {
            panic!("first claim must lead");
        };
        let Claim::Joined(waiter) = registry.claim(FetchKey::organization("A")) else {
            panic!("second claim must join");
        };
        assert!(registry.contains(&FetchKey::organization("A")));

        pending.settle(7);
        assert_eq!(waiter.wait().await, Some(7));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn dropped_leader_releases_key() {
        let registry = InFlight::<u32>::new();
        let Claim::Leader(pending) = registry.claim(FetchKey::child("K")) else {
            panic!("first claim must lead");
        };
        let Claim::Joined(waiter) = registry.claim(FetchKey::child("K")) else {
            panic!("second claim must join");
        };
        drop(pending);
        assert_eq!(waiter.wait().await, None);
        assert!(matches!(registry.claim(FetchKey::child("K")), Claim::Leader(_)));
    }

    #[test]
    fn distinct_keys_do_not_join() {
        let registry = InFlight::<()>::new();
        let _a = registry.claim(FetchKey::class("O", "C1"));
        assert!(matches!(registry.claim(FetchKey::class("O", "C2")), Claim::Leader(_)));
        assert_eq!(registry.len(), 1);
    }
}
