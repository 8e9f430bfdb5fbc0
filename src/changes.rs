//! Change notification bus
//!
//! Writers publish the identifier they changed; observers registered on that
//! identifier (or a related one) are called back synchronously. An observer
//! registered at `R` hears a change at `U` when:
//! - `R == U`
//! - `R` is an ancestor of `U` and the observer asked for descendants
//! - `U` is an ancestor of `R` (a collection change invalidates item views)

use crate::uri::ContentUri;
use crossbeam::channel::{self, Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Callback interface for change notifications
pub trait ChangeObserver: Send + Sync {
    fn on_change(&self, uri: &ContentUri);
}

/// Handle returned by registration, used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Clone)]
enum Target {
    Observer(Arc<dyn ChangeObserver>),
    Channel(Sender<ContentUri>),
}

struct Registration {
    id: ObserverId,
    uri: ContentUri,
    notify_for_descendants: bool,
    target: Target,
}

impl Registration {
    fn wants(&self, changed: &ContentUri) -> bool {
        self.uri == *changed
            || (self.notify_for_descendants && self.uri.is_ancestor_of(changed))
            || changed.is_ancestor_of(&self.uri)
    }
}

/// Registry of observers keyed by identifier
#[derive(Default)]
pub struct ChangeBus {
    registrations: Mutex<Vec<Registration>>,
    next_id: AtomicU64,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback observer
    pub fn register_observer(
        &self,
        uri: &ContentUri,
        notify_for_descendants: bool,
        observer: Arc<dyn ChangeObserver>,
    ) -> ObserverId {
        self.register(uri, notify_for_descendants, Target::Observer(observer))
    }

    /// Remove a registration. Returns false if it was already gone.
    pub fn unregister_observer(&self, id: ObserverId) -> bool {
        let mut registrations = self.lock();
        let before = registrations.len();
        registrations.retain(|r| r.id != id);
        registrations.len() != before
    }

    /// Register a channel-backed observer.
    ///
    /// The registration lives exactly as long as the returned [`Subscription`].
    pub fn subscribe(self: &Arc<Self>, uri: &ContentUri, notify_for_descendants: bool) -> Subscription {
        let (tx, rx) = channel::unbounded();
        let id = self.register(uri, notify_for_descendants, Target::Channel(tx));
        Subscription {
            id,
            rx,
            bus: Arc::downgrade(self),
        }
    }

    /// Number of live registrations
    pub fn observer_count(&self) -> usize {
        self.lock().len()
    }

    /// Publish a change at `uri`. Returns how many observers were notified.
    pub fn notify_change(&self, uri: &ContentUri) -> usize {
        // Collect under the lock, deliver outside it so observers may
        // re-register or query without deadlocking.
        let targets: Vec<Target> = self
            .lock()
            .iter()
            .filter(|r| r.wants(uri))
            .map(|r| r.target.clone())
            .collect();

        let mut delivered = 0;
        for target in targets {
            match target {
                Target::Observer(observer) => {
                    observer.on_change(uri);
                    delivered += 1;
                }
                Target::Channel(tx) => {
                    if tx.send(uri.clone()).is_ok() {
                        delivered += 1;
                    }
                }
            }
        }

        tracing::trace!(%uri, delivered, "change notified");
        delivered
    }

    fn register(&self, uri: &ContentUri, notify_for_descendants: bool, target: Target) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push(Registration {
            id,
            uri: uri.clone(),
            notify_for_descendants,
            target,
        });
        id
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Registration>> {
        self.registrations.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Receiving end of a channel registration. Dropping it unregisters.
pub struct Subscription {
    id: ObserverId,
    rx: Receiver<ContentUri>,
    bus: Weak<ChangeBus>,
}

impl Subscription {
    /// Next pending notification, without blocking
    pub fn try_recv(&self) -> Option<ContentUri> {
        self.rx.try_recv().ok()
    }

    /// All pending notifications
    pub fn drain(&self) -> Vec<ContentUri> {
        self.rx.try_iter().collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unregister_observer(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("pending", &self.rx.len())
            .finish()
    }
}
