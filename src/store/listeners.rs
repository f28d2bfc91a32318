//! Listener registry backing the store's update broadcast.
//!
//! Emissions are synchronous and carry no history: a listener only sees
//! snapshots published after it was registered.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

use super::lock::mutex_lock;
use crate::domain::Post;

const SOURCE: &str = "store::listeners";

/// Immutable copy of the post list at the moment of emission.
pub type Snapshot = Arc<[Post]>;

pub type ListenerId = u64;

type Listener = Arc<dyn Fn(Snapshot) + Send + Sync>;

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
}

impl ListenerRegistry {
    pub(crate) fn register(&self, listener: Listener) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        mutex_lock(&self.listeners, SOURCE, "register").push((id, listener));
        debug!(listener_id = id, "listener registered");
        id
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = mutex_lock(&self.listeners, SOURCE, "remove");
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        let removed = listeners.len() != before;
        if removed {
            debug!(listener_id = id, "listener removed");
        }
        removed
    }

    pub(crate) fn len(&self) -> usize {
        mutex_lock(&self.listeners, SOURCE, "len").len()
    }

    /// Deliver `snapshot` to every listener registered right now.
    ///
    /// The registry lock is released before callbacks run, so a listener may
    /// subscribe or unsubscribe from inside its callback.
    pub(crate) fn emit(&self, snapshot: &Snapshot) {
        let current: Vec<Listener> = mutex_lock(&self.listeners, SOURCE, "emit")
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        debug!(listeners = current.len(), posts = snapshot.len(), "broadcast");
        for listener in current {
            listener(Arc::clone(snapshot));
        }
    }
}

/// Handle on a registered listener. Released on [`Subscription::unsubscribe`]
/// or on drop, whichever comes first.
#[must_use = "dropping a subscription unregisters its listener"]
pub struct Subscription {
    id: ListenerId,
    registry: Weak<ListenerRegistry>,
    released: bool,
}

impl Subscription {
    pub(crate) fn new(id: ListenerId, registry: &Arc<ListenerRegistry>) -> Self {
        Self {
            id,
            registry: Arc::downgrade(registry),
            released: false,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("released", &self.released)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn counting(counter: &Arc<AtomicUsize>) -> Listener {
        let counter = Arc::clone(counter);
        Arc::new(move |_: Snapshot| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn empty() -> Snapshot {
        Arc::from(Vec::new())
    }

    #[test]
    fn emit_reaches_every_listener() {
        let registry = Arc::new(ListenerRegistry::default());
        let hits = Arc::new(AtomicUsize::new(0));
        registry.register(counting(&hits));
        registry.register(counting(&hits));

        registry.emit(&empty());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let registry = Arc::new(ListenerRegistry::default());
        let hits = Arc::new(AtomicUsize::new(0));
        let id = registry.register(counting(&hits));
        let sub = Subscription::new(id, &registry);
        drop(sub);

        assert_eq!(registry.len(), 0);
        registry.emit(&empty());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unsubscribe_only_removes_own_listener() {
        let registry = Arc::new(ListenerRegistry::default());
        let hits = Arc::new(AtomicUsize::new(0));
        let first = Subscription::new(registry.register(counting(&hits)), &registry);
        let _second = Subscription::new(registry.register(counting(&hits)), &registry);

        first.unsubscribe();
        registry.emit(&empty());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscription_outliving_registry_is_harmless() {
        let registry = Arc::new(ListenerRegistry::default());
        let sub = Subscription::new(registry.register(Arc::new(|_: Snapshot| {})), &registry);
        drop(registry);
        sub.unsubscribe();
    }

    #[test]
    fn listener_may_unsubscribe_during_emit() {
        let registry = Arc::new(ListenerRegistry::default());
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let inner = Arc::clone(&slot);
        let id = registry.register(Arc::new(move |_: Snapshot| {
            if let Some(sub) = inner.lock().expect("slot").take() {
                sub.unsubscribe();
            }
        }));
        *slot.lock().expect("slot") = Some(Subscription::new(id, &registry));

        registry.emit(&empty());
        assert_eq!(registry.len(), 0);
    }
}
